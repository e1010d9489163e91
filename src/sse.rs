/// One complete SSE frame: optional `event:` name plus joined `data:` lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseFrame {
    pub event: Option<String>,
    pub data: String,
}

/// Incremental parser for SSE text streams.
///
/// Frames are delimited by a blank line. Data may be split across arbitrary
/// transport chunks; the parser buffers partial frames between feeds.
#[derive(Debug, Default)]
pub struct SseStreamParser {
    buffer: String,
}

impl SseStreamParser {
    /// Feed arbitrary bytes into the parser and drain complete frames.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<SseFrame> {
        self.buffer.push_str(&String::from_utf8_lossy(bytes));
        let mut frames = Vec::new();

        while let Some(split) = self.buffer.find("\n\n") {
            let frame = self.buffer[..split].to_string();
            self.buffer.drain(0..split + 2);

            if let Some(frame) = parse_frame(&frame) {
                frames.push(frame);
            }
        }

        frames
    }

    pub fn is_empty_buffer(&self) -> bool {
        self.buffer.trim().is_empty()
    }
}

fn parse_frame(frame: &str) -> Option<SseFrame> {
    let mut event = None;
    let mut data_lines = Vec::new();

    for line in frame.lines() {
        if let Some(value) = line.strip_prefix("event:") {
            let value = value.trim();
            if !value.is_empty() {
                event = Some(value.to_string());
            }
        } else if let Some(value) = line.strip_prefix("data:") {
            let value = value.trim();
            if !value.is_empty() {
                data_lines.push(value);
            }
        }
        // Comment lines (leading ':') and other fields are ignored.
    }

    if data_lines.is_empty() {
        return None;
    }

    let data = data_lines.join("\n");
    if data == "[DONE]" {
        return None;
    }

    Some(SseFrame { event, data })
}

#[cfg(test)]
mod tests {
    use super::SseStreamParser;

    #[test]
    fn parse_sse_frames_incrementally() {
        let mut parser = SseStreamParser::default();
        let mut frames = Vec::new();

        frames.extend(parser.feed(b"event: message\ndata: {\"content\":\"Hel"));
        assert!(frames.is_empty());

        frames.extend(parser.feed(b"lo\"}\n\n"));
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].event.as_deref(), Some("message"));
        assert_eq!(frames[0].data, r#"{"content":"Hello"}"#);
        assert!(parser.is_empty_buffer());
    }

    #[test]
    fn done_sentinel_and_empty_frames_are_skipped() {
        let mut parser = SseStreamParser::default();
        let frames = parser.feed(b"data: [DONE]\n\n\n\ndata:\n\n");
        assert!(frames.is_empty());
        assert!(parser.is_empty_buffer());
    }

    #[test]
    fn comment_lines_are_ignored() {
        let mut parser = SseStreamParser::default();
        let frames = parser.feed(b": keep-alive\n\nevent: done\ndata: {}\n\n");
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].event.as_deref(), Some("done"));
    }

    #[test]
    fn multi_line_data_is_joined() {
        let mut parser = SseStreamParser::default();
        let frames = parser.feed(b"data: {\"content\":\ndata: \"x\"}\n\n");
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].data, "{\"content\":\n\"x\"}");
    }

    #[test]
    fn frames_drain_in_arrival_order() {
        let mut parser = SseStreamParser::default();
        let frames = parser.feed(
            concat!(
                "event: message\ndata: {\"content\":\"A\"}\n\n",
                "event: message\ndata: {\"content\":\"B\"}\n\n",
                "event: done\ndata: {}\n\n",
            )
            .as_bytes(),
        );

        assert_eq!(frames.len(), 3);
        assert_eq!(frames[0].data, r#"{"content":"A"}"#);
        assert_eq!(frames[1].data, r#"{"content":"B"}"#);
        assert_eq!(frames[2].event.as_deref(), Some("done"));
    }
}
