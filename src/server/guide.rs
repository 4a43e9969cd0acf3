//! Embedded starter guide served at `GET /`.
//!
//! Plain text, rendered with the request's own origin substituted into the
//! example URLs so the snippets are copy-pasteable against this deployment.

const GUIDE: &str = r#"chat-relay — plain-text streaming gateway
==========================================

This service forwards chat requests to a hosted language model and returns
either a complete JSON response or a live token stream as plain text.

Endpoints
---------

  GET  /          this guide
  GET  /health    service status, model identifier and endpoint list
  POST /chat      complete response as JSON
  POST /stream    token stream as plain UTF-8 text

Request body
------------

Both POST endpoints accept the same two body shapes.

Full message list (conversation history, system prompts, multi-turn):

  {
    "messages": [
      { "role": "system", "content": "You are a helpful assistant" },
      { "role": "user",   "content": "Why is the sky blue?" }
    ]
  }

Simple prompt (optionally with a system instruction):

  {
    "prompt": "Why is the sky blue?",
    "system": "You are a helpful assistant"
  }

Quick start with curl
---------------------

Complete response:

  curl {origin}/chat \
    -H 'Content-Type: application/json' \
    -d '{"prompt": "Write a haiku about rivers"}'

Streaming response (tokens print as they arrive):

  curl -N {origin}/stream \
    -H 'Content-Type: application/json' \
    -d '{"prompt": "Tell me a short story"}'

Multi-turn conversation:

  curl {origin}/chat \
    -H 'Content-Type: application/json' \
    -d '{
      "messages": [
        { "role": "user", "content": "My name is Ada." },
        { "role": "assistant", "content": "Nice to meet you, Ada!" },
        { "role": "user", "content": "What is my name?" }
      ]
    }'

From JavaScript
---------------

  const res = await fetch('{origin}/stream', {
    method: 'POST',
    headers: { 'Content-Type': 'application/json' },
    body: JSON.stringify({ prompt: 'Hello!' }),
  });

  const reader = res.body.getReader();
  const decoder = new TextDecoder();
  while (true) {
    const { done, value } = await reader.read();
    if (done) break;
    process.stdout.write(decoder.decode(value, { stream: true }));
  }

From Python
-----------

  import requests

  with requests.post('{origin}/stream',
                     json={'prompt': 'Hello!'}, stream=True) as res:
      for chunk in res.iter_content(chunk_size=None):
          print(chunk.decode(), end='', flush=True)

Notes
-----

- /stream emits bare text: no event framing, no JSON, no [DONE] marker.
  Concatenate the chunks and you have the full answer.
- All endpoints send permissive CORS headers, so browser pages served from
  any origin can call them directly.
- Check {origin}/health to see which model this deployment targets.
"#;

/// Render the guide with the request's origin substituted into example URLs.
pub fn render(origin: &str) -> String {
    GUIDE.replace("{origin}", origin)
}
