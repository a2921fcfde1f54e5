//! The single chat page: PDF viewer on the left, transcript on the right.
//!
//! The inline script is the browser rendition of `controller::ChatController`
//! and keeps the same rules: one question in flight, blank questions ignored,
//! busy flag and loading entry cleared in `finally`.

use super::styles::STYLE;

const SCRIPT: &str = r#"
let isLoading = false;
let startTime = 0;

async function loadPdfInfo() {
    const info = document.getElementById('pdfInfo');
    try {
        const response = await fetch('/api/pdf_info');
        const data = await response.json();
        if (data.error) {
            info.textContent = 'Error: ' + data.error;
        } else if (data.file_name) {
            info.textContent = 'Document: ' + data.file_name;
            document.getElementById('pdfIframe').src = '/pdf/' + encodeURIComponent(data.file_name);
        } else {
            info.textContent = 'Error: Failed to load document info';
        }
    } catch (error) {
        info.textContent = 'Error: Failed to load document info';
    }
}

async function askQuestion(questionText = null) {
    if (isLoading) return;

    const input = document.getElementById('questionInput');
    const fromInput = !questionText;
    const question = fromInput ? input.value.trim() : questionText;
    if (!question.trim()) return;

    addUserMessage(question);
    isLoading = true;
    startTime = Date.now();
    if (fromInput) {
        input.value = '';
    }
    showLoading();

    try {
        const response = await fetch('/api/ask', {
            method: 'POST',
            headers: { 'Content-Type': 'application/json' },
            body: JSON.stringify({ question: question })
        });
        const data = await response.json();

        if (data.error) {
            addAIMessage(errorContent('Error: ' + data.error), true);
        } else {
            addAIMessage(formatAnswer(data), false);
        }
    } catch (error) {
        addAIMessage(errorContent('Network error: ' + error.message), true);
    } finally {
        isLoading = false;
        hideLoading();
    }
}

function errorContent(text) {
    const div = document.createElement('div');
    div.className = 'answer-text';
    div.textContent = text;
    return [div];
}

function formatAnswer(data) {
    const sources = data.sources || [];
    const elapsed = ((Date.now() - startTime) / 1000).toFixed(2);

    const text = document.createElement('div');
    text.className = 'answer-text';
    text.textContent = data.answer || '';

    const button = document.createElement('button');
    button.className = 'btn';
    button.textContent = 'Show Details';
    button.addEventListener('click', function() { toggleDetails(button); });

    const meta = document.createElement('div');
    meta.className = 'answer-meta';
    meta.textContent = 'Time: ' + elapsed + 's\nSources: ' + (sources.join(', ') || 'No sources');
    meta.style.whiteSpace = 'pre-line';

    return [text, button, meta];
}

function toggleDetails(button) {
    const meta = button.nextElementSibling;
    if (meta.classList.contains('show')) {
        meta.classList.remove('show');
        button.textContent = 'Show Details';
    } else {
        meta.classList.add('show');
        button.textContent = 'Hide Details';
    }
}

function scrollToBottom(container) {
    container.scrollTop = container.scrollHeight;
}

function addUserMessage(question) {
    const messages = document.getElementById('chatMessages');
    document.getElementById('welcomeMessage').classList.add('hidden');

    const div = document.createElement('div');
    div.className = 'message question';
    div.textContent = question;
    messages.appendChild(div);
    scrollToBottom(messages);
}

function addAIMessage(nodes, isError) {
    const messages = document.getElementById('chatMessages');
    const div = document.createElement('div');
    div.className = isError ? 'message answer error' : 'message answer';
    for (const node of nodes) {
        div.appendChild(node);
    }
    messages.appendChild(div);
    scrollToBottom(messages);
}

function showLoading() {
    const messages = document.getElementById('chatMessages');
    const div = document.createElement('div');
    div.id = 'loadingMessage';
    div.className = 'message answer loading';
    div.innerHTML = '<div class="spinner"></div>';
    messages.appendChild(div);
    scrollToBottom(messages);
}

function hideLoading() {
    const loading = document.getElementById('loadingMessage');
    if (loading) {
        loading.remove();
    }
}

document.addEventListener('DOMContentLoaded', function() {
    loadPdfInfo();
    document.getElementById('questionInput').addEventListener('keydown', function(e) {
        if (e.key === 'Enter' && !e.shiftKey) {
            e.preventDefault();
            askQuestion();
        }
    });
    document.getElementById('sendButton').addEventListener('click', function() {
        askQuestion();
    });
});
"#;

pub fn render_page() -> String {
    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>PDF Chat</title>
    <style>{style}</style>
</head>
<body>
    <div class="layout">
        <div class="viewer-pane">
            <div class="pdf-info" id="pdfInfo">Loading document...</div>
            <iframe id="pdfIframe" title="PDF viewer"></iframe>
        </div>
        <div class="chat-pane">
            <div class="chat-messages" id="chatMessages">
                <div class="welcome" id="welcomeMessage">
                    Ask a question about the document to get started.
                </div>
            </div>
            <div class="chat-input">
                <textarea id="questionInput" rows="2" placeholder="Ask a question..."></textarea>
                <button id="sendButton">Send</button>
            </div>
        </div>
    </div>
    <script>{script}</script>
</body>
</html>"##,
        style = STYLE,
        script = SCRIPT,
    )
}
