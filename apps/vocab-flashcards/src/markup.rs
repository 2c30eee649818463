//! Restricted inline markup for example sentences.
//!
//! Sentences may carry a small subset of HTML. Known emphasis tags become
//! styled segments; every other tag is stripped and the contents of
//! `script`/`style` are dropped.

use regex::Regex;
use std::sync::OnceLock;

/// Emphasis applied to a run of text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Emphasis {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
}

/// A run of text with uniform emphasis. Newlines come from `<br>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub text: String,
    pub emphasis: Emphasis,
}

#[derive(Default)]
struct Depth {
    bold: usize,
    italic: usize,
    underline: usize,
    hidden: usize,
}

impl Depth {
    fn emphasis(&self) -> Emphasis {
        Emphasis {
            bold: self.bold > 0,
            italic: self.italic > 0,
            underline: self.underline > 0,
        }
    }

    fn counter(&mut self, tag: &str) -> Option<&mut usize> {
        match tag {
            "b" | "strong" => Some(&mut self.bold),
            "i" | "em" => Some(&mut self.italic),
            "u" | "mark" => Some(&mut self.underline),
            "script" | "style" => Some(&mut self.hidden),
            _ => None,
        }
    }
}

fn tag_regex() -> &'static Regex {
    static TAG: OnceLock<Regex> = OnceLock::new();
    TAG.get_or_init(|| {
        Regex::new(r"<(/?)([A-Za-z][A-Za-z0-9]*)\b[^>]*>").expect("tag pattern is valid")
    })
}

/// Parse a sentence into styled segments.
pub fn parse_sentence(source: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut depth = Depth::default();
    let mut last = 0;

    for caps in tag_regex().captures_iter(source) {
        let Some(whole) = caps.get(0) else { continue };
        if depth.hidden == 0 {
            push_text(&mut segments, &source[last..whole.start()], depth.emphasis());
        }
        last = whole.end();

        let closing = !caps[1].is_empty();
        let tag = caps[2].to_ascii_lowercase();
        if tag == "br" {
            if depth.hidden == 0 {
                push_text(&mut segments, "\n", depth.emphasis());
            }
            continue;
        }
        if let Some(counter) = depth.counter(&tag) {
            if closing {
                *counter = counter.saturating_sub(1);
            } else {
                *counter += 1;
            }
        }
    }
    if depth.hidden == 0 {
        push_text(&mut segments, &source[last..], depth.emphasis());
    }
    segments
}

fn push_text(segments: &mut Vec<Segment>, raw: &str, emphasis: Emphasis) {
    if raw.is_empty() {
        return;
    }
    let text = decode_entities(raw);
    match segments.last_mut() {
        Some(last) if last.emphasis == emphasis => last.text.push_str(&text),
        _ => segments.push(Segment { text, emphasis }),
    }
}

fn decode_entities(raw: &str) -> String {
    if !raw.contains('&') {
        return raw.to_string();
    }
    raw.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}
