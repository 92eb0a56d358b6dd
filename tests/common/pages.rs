use edit_anchor::dom::{Document, Dom, NodeId, Rect};

pub const PAGE_URL: &str = "https://news.example.com/articles/42";

pub struct Article {
    pub doc: Document,
    pub body: NodeId,
    pub main: NodeId,
    pub title: NodeId,
    pub lead: NodeId,
    pub button: NodeId,
    pub image_box: NodeId,
}

/// ```text
/// body
///   header > nav
///   main.content
///     h1            "Quarterly results"
///     p             "Hello World"
///     p.note        "Figures are unaudited."
///     button        "Subscribe"
///     div.figure    (no text)
/// ```
pub fn article() -> Article {
    let mut doc = Document::new(PAGE_URL);
    let body = doc.body().unwrap();

    let header = doc.append_element(body, "header");
    doc.append_element(header, "nav");
    doc.set_rect(header, Rect::new(0.0, 0.0, 1024.0, 64.0));

    let main = doc.append_element(body, "main");
    doc.set_attribute(main, "class", "content");
    doc.set_rect(main, Rect::new(80.0, 0.0, 1024.0, 600.0));

    let title = doc.append_element(main, "h1");
    doc.append_text(title, "Quarterly results");
    doc.set_rect(title, Rect::new(96.0, 32.0, 960.0, 40.0));

    let lead = doc.append_element(main, "p");
    doc.append_text(lead, "Hello World");
    doc.set_rect(lead, Rect::new(150.0, 32.0, 960.0, 24.0));

    let note = doc.append_element(main, "p");
    doc.set_attribute(note, "class", "note");
    doc.append_text(note, "Figures are unaudited.");
    doc.set_rect(note, Rect::new(190.0, 32.0, 960.0, 24.0));

    let button = doc.append_element(main, "button");
    doc.append_text(button, "Subscribe");
    doc.set_rect(button, Rect::new(230.0, 32.0, 120.0, 32.0));

    let image_box = doc.append_element(main, "div");
    doc.set_attribute(image_box, "class", "figure");
    doc.set_rect(image_box, Rect::new(280.0, 32.0, 400.0, 300.0));

    Article {
        doc,
        body,
        main,
        title,
        lead,
        button,
        image_box,
    }
}

pub fn text_of(doc: &Document, node: NodeId) -> String {
    doc.text_content(node)
}
