//! Incremental parsing of server-sent event bodies.

/// Splits a byte stream into SSE lines and yields the `data:` payloads.
///
/// Bytes are buffered until a newline arrives, so chunk boundaries may fall
/// anywhere, including inside a multi-byte character.
#[derive(Debug, Default)]
pub struct SseLineBuffer {
    buffer: Vec<u8>,
}

impl SseLineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk; returns the payloads of every line it completed.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(chunk);

        let mut payloads = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            if let Some(data) = data_payload(&line) {
                payloads.push(data);
            }
        }
        payloads
    }

    /// Payload of a final line that was never newline-terminated.
    pub fn finish(&mut self) -> Option<String> {
        let rest = std::mem::take(&mut self.buffer);
        data_payload(&rest)
    }
}

fn data_payload(line: &[u8]) -> Option<String> {
    let line = String::from_utf8_lossy(line);
    let line = line.trim();
    let data = line.strip_prefix("data:")?.trim_start();
    if data.is_empty() || data == "[DONE]" {
        return None;
    }
    Some(data.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yields_complete_data_lines_only() {
        let mut buffer = SseLineBuffer::new();
        assert!(buffer.push(b"data: {\"a\":").is_empty());
        assert_eq!(buffer.push(b"1}\r\n\r\ndata: {\"b\":2}\n"), vec![
            "{\"a\":1}".to_string(),
            "{\"b\":2}".to_string()
        ]);
    }

    #[test]
    fn ignores_comments_events_and_done() {
        let mut buffer = SseLineBuffer::new();
        let out = buffer.push(b": keep-alive\nevent: message\ndata: [DONE]\ndata:\n");
        assert!(out.is_empty());
    }

    #[test]
    fn multibyte_characters_survive_chunk_splits() {
        let mut buffer = SseLineBuffer::new();
        let line = "data: caf\u{e9} \u{2022}\n".as_bytes();
        let (head, tail) = line.split_at(10);
        assert!(buffer.push(head).is_empty());
        assert_eq!(buffer.push(tail), vec!["caf\u{e9} \u{2022}".to_string()]);
    }

    #[test]
    fn finish_flushes_unterminated_line() {
        let mut buffer = SseLineBuffer::new();
        buffer.push(b"data: tail");
        assert_eq!(buffer.finish(), Some("tail".to_string()));
        assert_eq!(buffer.finish(), None);
    }
}
