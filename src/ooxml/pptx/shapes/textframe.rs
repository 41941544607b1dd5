//! Text frame for accessing and rewriting text content in shapes.
//!
//! A text frame is the `<p:txBody>` of an autoshape: body properties, an
//! optional list style, then one or more `<a:p>` paragraphs made of runs
//! (`a:r`), line breaks (`a:br`) and fields (`a:fld`).
use crate::ooxml::xml::XmlElement;

/// Vertical tab, the in-paragraph rendering of `<a:br/>`.
const LINE_BREAK: char = '\u{b}';

/// A text frame containing text content.
#[derive(Debug, Clone, Copy)]
pub struct TextFrame<'a> {
    tx_body: &'a XmlElement,
}

impl<'a> TextFrame<'a> {
    pub(crate) fn new(tx_body: &'a XmlElement) -> Self {
        Self { tx_body }
    }

    /// The `a:p` elements in order.
    pub fn paragraphs(self) -> impl Iterator<Item = &'a XmlElement> {
        self.tx_body
            .children()
            .filter(|e| e.local_name() == b"p")
    }

    pub fn paragraph_count(&self) -> usize {
        self.paragraphs().count()
    }

    /// Runs, breaks and fields in the first paragraph.
    pub fn first_paragraph_content_count(&self) -> usize {
        self.paragraphs()
            .next()
            .map_or(0, |p| p.children().filter(|e| is_content(e)).count())
    }

    /// All text; paragraphs joined by `\n`.
    pub fn text(&self) -> String {
        self.paragraphs()
            .map(paragraph_text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn is_content(e: &XmlElement) -> bool {
    matches!(e.local_name(), b"r" | b"br" | b"fld")
}

/// Text of one paragraph.
pub fn paragraph_text(p: &XmlElement) -> String {
    let mut text = String::new();
    for child in p.children() {
        match child.local_name() {
            b"r" | b"fld" => {
                if let Some(t) = child.child("t") {
                    text.push_str(&t.text());
                }
            },
            b"br" => text.push(LINE_BREAK),
            _ => {},
        }
    }
    text
}

/// Return the `p:txBody` of an autoshape, creating an empty one when the
/// shape has none. `p` and `a` are the prefixes bound in the part.
pub fn ensure_tx_body<'s>(sp: &'s mut XmlElement, p: &str, a: &str) -> Option<&'s mut XmlElement> {
    if sp.child("txBody").is_none() {
        let mut body = XmlElement::new(&format!("{}:txBody", p));
        body.push_child(XmlElement::new(&format!("{}:bodyPr", a)));
        body.push_child(XmlElement::new(&format!("{}:lstStyle", a)));
        body.push_child(XmlElement::new(&format!("{}:p", a)));

        match sp
            .element_positions(|e| e.local_name() == b"extLst")
            .first()
        {
            Some(&pos) => sp.insert_child(pos, body),
            None => sp.push_child(body),
        }
    }
    sp.child_mut("txBody")
}

/// Collapse a text frame to one paragraph holding `content`.
///
/// Paragraphs after the first are dropped. In the first paragraph the first
/// run keeps its `a:rPr` and gets the new text; other runs, breaks and fields
/// are dropped. Without a run, a bare one is created before `a:endParaRPr`.
/// Each vertical tab in `content` becomes an `a:br` followed by a new run
/// carrying the same run properties.
pub fn collapse_into_first_run(tx_body: &mut XmlElement, a: &str, content: &str) {
    let paragraphs = tx_body.element_positions(|e| e.local_name() == b"p");
    let first = match paragraphs.first() {
        Some(&first) => {
            for &pos in paragraphs[1..].iter().rev() {
                tx_body.remove_node(pos);
            }
            first
        },
        None => {
            tx_body.push_child(XmlElement::new(&format!("{}:p", a)));
            tx_body.nodes().len() - 1
        },
    };

    let Some(paragraph) = tx_body.element_at_mut(first) else {
        return;
    };

    let mut kept_run = false;
    paragraph.remove_children(|e| match e.local_name() {
        b"r" if !kept_run => {
            kept_run = true;
            false
        },
        b"r" | b"br" | b"fld" => true,
        _ => false,
    });

    let mut lines = content.split(LINE_BREAK);
    let first_line = lines.next().unwrap_or_default();

    let run_pos = match paragraph.element_positions(|e| e.local_name() == b"r").first() {
        Some(&pos) => {
            if let Some(run) = paragraph.element_at_mut(pos) {
                match run.child_mut("t") {
                    Some(t) => t.set_text(first_line),
                    None => run.push_child(text_element(a, first_line)),
                }
            }
            pos
        },
        None => {
            let mut run = XmlElement::new(&format!("{}:r", a));
            run.push_child(text_element(a, first_line));
            let pos = paragraph
                .element_positions(|e| e.local_name() == b"endParaRPr")
                .first()
                .copied()
                .unwrap_or(paragraph.nodes().len());
            paragraph.insert_child(pos, run);
            pos
        },
    };

    let rpr = paragraph
        .element_at(run_pos)
        .and_then(|run| run.child("rPr"))
        .cloned();
    let mut at = run_pos + 1;
    for line in lines {
        let mut br = XmlElement::new(&format!("{}:br", a));
        let mut run = XmlElement::new(&format!("{}:r", a));
        if let Some(rpr) = &rpr {
            br.push_child(rpr.clone());
            run.push_child(rpr.clone());
        }
        run.push_child(text_element(a, line));
        paragraph.insert_child(at, br);
        paragraph.insert_child(at + 1, run);
        at += 2;
    }
}

fn text_element(a: &str, content: &str) -> XmlElement {
    let mut t = XmlElement::new(&format!("{}:t", a));
    t.set_text(content);
    t
}
