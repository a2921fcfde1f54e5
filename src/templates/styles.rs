//! CSS for the chat page.

// ============================================================================
// CSS Styles
// ============================================================================

pub const STYLE: &str = r#"
/* Solarized Light Theme */
:root {
    --base01: #586e75;
    --base00: #657b83;
    --base1: #93a1a1;
    --base2: #eee8d5;
    --base3: #fdf6e3;

    --red: #dc322f;
    --blue: #268bd2;
    --cyan: #2aa198;

    --bg: var(--base3);
    --fg: var(--base00);
    --muted: var(--base1);
    --border: var(--base2);
    --accent: var(--base2);
    --link: var(--blue);
}

* { box-sizing: border-box; margin: 0; padding: 0; }

body {
    font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, "Helvetica Neue", Arial, sans-serif;
    line-height: 1.6;
    color: var(--fg);
    background: var(--bg);
    height: 100vh;
    overflow: hidden;
}

.layout {
    display: flex;
    height: 100vh;
}

.viewer-pane {
    flex: 1;
    display: flex;
    flex-direction: column;
    border-right: 1px solid var(--border);
}

.pdf-info {
    background: var(--accent);
    padding: 0.75rem 1rem;
    font-size: 0.9rem;
}

.viewer-pane iframe {
    flex: 1;
    width: 100%;
    border: none;
}

.chat-pane {
    width: 420px;
    display: flex;
    flex-direction: column;
}

.chat-messages {
    flex: 1;
    overflow-y: auto;
    padding: 1rem;
}

.welcome {
    color: var(--muted);
    text-align: center;
    margin-top: 2rem;
}
.hidden { display: none; }

.message {
    margin-bottom: 0.75rem;
    padding: 0.6rem 0.8rem;
    border-radius: 6px;
}
.message.question {
    background: var(--accent);
    margin-left: 2rem;
}
.message.answer {
    border: 1px solid var(--border);
    margin-right: 2rem;
}
.message.answer.error {
    border-color: var(--red);
    color: var(--red);
}

.answer-text { white-space: pre-wrap; }

.btn {
    margin-top: 0.5rem;
    padding: 0.2rem 0.6rem;
    border: 1px solid var(--border);
    border-radius: 4px;
    background: var(--bg);
    color: var(--link);
    cursor: pointer;
    font-size: 0.8rem;
}

.answer-meta {
    display: none;
    margin-top: 0.4rem;
    font-size: 0.8rem;
    color: var(--base01);
}
.answer-meta.show { display: block; }

.spinner {
    width: 1.2rem;
    height: 1.2rem;
    border: 2px solid var(--border);
    border-top-color: var(--cyan);
    border-radius: 50%;
    animation: spin 0.8s linear infinite;
}
@keyframes spin { to { transform: rotate(360deg); } }

.chat-input {
    display: flex;
    gap: 0.5rem;
    padding: 0.75rem;
    border-top: 1px solid var(--border);
}
.chat-input textarea {
    flex: 1;
    resize: none;
    padding: 0.5rem;
    border: 1px solid var(--border);
    border-radius: 4px;
    font: inherit;
}
.chat-input button {
    padding: 0 1rem;
    border: none;
    border-radius: 4px;
    background: var(--blue);
    color: var(--base3);
    cursor: pointer;
}
"#;
