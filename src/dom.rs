//! A minimal element tree for rendered slide decks.
//!
//! The deck is read with quick-xml events into an arena of nodes indexed by
//! [`NodeId`]. The tree supports the handful of operations the annotation
//! pass needs (document-order traversal, ancestor lookup, deep cloning, and
//! sibling insertion) and serializes back out with text and attribute bytes
//! untouched, so markup the pass does not edit round-trips verbatim.
//!
//! Rendered decks are HTML, not XML, so the reader makes two accommodations:
//! void elements (`<meta>`, `<br>`, ...) close implicitly, and end tags with
//! no matching open element are dropped instead of failing the parse.

use phf::phf_set;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// HTML elements that never take children or a closing tag.
static VOID_ELEMENTS: phf::Set<&'static str> = phf_set! {
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link",
    "meta", "param", "source", "track", "wbr",
};

/// Index of a node in the arena.
pub type NodeId = usize;

/// A single node in the deck tree.
#[derive(Debug, Clone)]
pub struct Node {
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub data: NodeData,
}

/// The kinds of nodes a deck contains.
#[derive(Debug, Clone)]
pub enum NodeData {
    Document,
    Element(Element),
    Text(String),
    Comment(String),
    Doctype(String),
    CData(String),
    Decl(String),
}

/// An element's tag name and attributes.
///
/// Tag and attribute names are lowercased on read; attribute values are kept
/// as raw bytes from the input (entities intact).
#[derive(Debug, Clone)]
pub struct Element {
    pub name: String,
    pub attrs: Vec<(String, String)>,
    self_closing: bool,
}

impl Element {
    /// The value of an attribute, if present.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Whether the element's class attribute contains the given class.
    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .map_or(false, |c| c.split_whitespace().any(|c| c == class))
    }
}

/// The deck tree. Node 0 is always the document root.
#[derive(Debug)]
pub struct Dom {
    nodes: Vec<Node>,
}

impl Dom {
    pub const ROOT: NodeId = 0;

    /// Parse a rendered deck into a tree.
    pub fn parse(html: &str) -> Result<Dom, String> {
        let mut reader = Reader::from_str(html);
        let config = reader.config_mut();
        config.trim_text(false);
        config.check_end_names = false;
        config.allow_unmatched_ends = true;

        let mut dom = Dom {
            nodes: vec![Node {
                parent: None,
                children: Vec::new(),
                data: NodeData::Document,
            }],
        };

        // Stack of open elements; the document root stays at the bottom.
        let mut open: Vec<NodeId> = vec![Dom::ROOT];

        loop {
            match reader.read_event() {
                Err(e) => {
                    return Err(format!(
                        "Error parsing the deck at position {}—{}",
                        reader.buffer_position(),
                        e
                    ))
                }
                Ok(Event::Eof) => break,
                Ok(Event::Start(e)) => {
                    let element = element_from_start(&e)?;
                    let is_void = VOID_ELEMENTS.contains(element.name.as_str());
                    let id = dom.push(NodeData::Element(element));
                    dom.append_child(open[open.len() - 1], id);
                    if !is_void {
                        open.push(id);
                    }
                }
                Ok(Event::Empty(e)) => {
                    let mut element = element_from_start(&e)?;
                    element.self_closing = true;
                    let id = dom.push(NodeData::Element(element));
                    dom.append_child(open[open.len() - 1], id);
                }
                Ok(Event::End(e)) => {
                    let name = String::from_utf8_lossy(e.name().as_ref()).to_lowercase();
                    // Close up to the nearest matching open element. An end
                    // tag matching nothing on the stack is dropped.
                    if let Some(pos) = open
                        .iter()
                        .rposition(|&n| dom.element(n).map_or(false, |el| el.name == name))
                    {
                        open.truncate(pos);
                    }
                }
                Ok(Event::Text(e)) => {
                    let id =
                        dom.push(NodeData::Text(String::from_utf8_lossy(e.as_ref()).into_owned()));
                    dom.append_child(open[open.len() - 1], id);
                }
                Ok(Event::GeneralRef(e)) => {
                    // Entity references stay escaped in the tree and on output.
                    let id = dom.push(NodeData::Text(format!(
                        "&{};",
                        String::from_utf8_lossy(e.as_ref())
                    )));
                    dom.append_child(open[open.len() - 1], id);
                }
                Ok(Event::CData(e)) => {
                    let id = dom
                        .push(NodeData::CData(String::from_utf8_lossy(e.as_ref()).into_owned()));
                    dom.append_child(open[open.len() - 1], id);
                }
                Ok(Event::Comment(e)) => {
                    let id = dom.push(NodeData::Comment(
                        String::from_utf8_lossy(e.as_ref()).into_owned(),
                    ));
                    dom.append_child(open[open.len() - 1], id);
                }
                Ok(Event::DocType(e)) => {
                    let id = dom.push(NodeData::Doctype(
                        String::from_utf8_lossy(e.as_ref()).into_owned(),
                    ));
                    dom.append_child(open[open.len() - 1], id);
                }
                Ok(Event::Decl(e)) => {
                    let id = dom
                        .push(NodeData::Decl(String::from_utf8_lossy(e.as_ref()).into_owned()));
                    dom.append_child(open[open.len() - 1], id);
                }
                // Processing instructions do not occur in rendered decks.
                Ok(Event::PI(_)) => {}
            }
        }

        Ok(dom)
    }

    /// Serialize the tree back to markup.
    pub fn serialize(&self) -> String {
        let mut out = String::new();
        for &child in &self.nodes[Dom::ROOT].children {
            self.write_node(child, &mut out);
        }
        out
    }

    fn write_node(&self, id: NodeId, out: &mut String) {
        match &self.nodes[id].data {
            NodeData::Document => {}
            NodeData::Element(el) => {
                out.push('<');
                out.push_str(&el.name);
                for (k, v) in &el.attrs {
                    out.push(' ');
                    out.push_str(k);
                    out.push_str("=\"");
                    out.push_str(v);
                    out.push('"');
                }
                if el.self_closing {
                    out.push_str("/>");
                } else if VOID_ELEMENTS.contains(el.name.as_str()) {
                    // Void elements keep their HTML form: no slash, no end tag.
                    out.push('>');
                } else {
                    out.push('>');
                    for &child in &self.nodes[id].children {
                        self.write_node(child, out);
                    }
                    out.push_str("</");
                    out.push_str(&el.name);
                    out.push('>');
                }
            }
            NodeData::Text(t) => out.push_str(t),
            NodeData::Comment(c) => {
                out.push_str("<!--");
                out.push_str(c);
                out.push_str("-->");
            }
            NodeData::Doctype(d) => {
                out.push_str("<!DOCTYPE ");
                out.push_str(d);
                out.push('>');
            }
            NodeData::CData(c) => {
                out.push_str("<![CDATA[");
                out.push_str(c);
                out.push_str("]]>");
            }
            NodeData::Decl(d) => {
                out.push_str("<?");
                out.push_str(d);
                out.push_str("?>");
            }
        }
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    /// The node's element data, if it is an element.
    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match &self.nodes[id].data {
            NodeData::Element(e) => Some(e),
            _ => None,
        }
    }

    /// Create a detached element node.
    pub fn create_element(&mut self, name: &str, attrs: Vec<(String, String)>) -> NodeId {
        self.push(NodeData::Element(Element {
            name: name.to_string(),
            attrs,
            self_closing: false,
        }))
    }

    fn push(&mut self, data: NodeData) -> NodeId {
        self.nodes.push(Node {
            parent: None,
            children: Vec::new(),
            data,
        });
        self.nodes.len() - 1
    }

    /// Append a detached node as the last child of a parent.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[child].parent = Some(parent);
        self.nodes[parent].children.push(child);
    }

    /// Insert a detached node as the next sibling of an attached node.
    pub fn insert_after(&mut self, sibling: NodeId, new: NodeId) {
        if let Some(parent) = self.nodes[sibling].parent {
            if let Some(pos) = self.nodes[parent].children.iter().position(|&c| c == sibling) {
                self.nodes[parent].children.insert(pos + 1, new);
                self.nodes[new].parent = Some(parent);
            }
        }
    }

    /// Remove a node from its parent. The node stays in the arena but is no
    /// longer reachable from the root, so it never serializes.
    pub fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes[id].parent {
            self.nodes[parent].children.retain(|&c| c != id);
            self.nodes[id].parent = None;
        }
    }

    /// Deep-copy a subtree. The copy is detached and shares nothing with the
    /// source, so later edits to either side cannot alias.
    pub fn deep_clone(&mut self, src: NodeId) -> NodeId {
        let data = self.nodes[src].data.clone();
        let children = self.nodes[src].children.clone();
        let copy = self.push(data);
        for child in children {
            let child_copy = self.deep_clone(child);
            self.append_child(copy, child_copy);
        }
        copy
    }

    /// All nodes below the given node, in document order.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.nodes[id].children.iter().rev().copied().collect();
        while let Some(n) = stack.pop() {
            out.push(n);
            stack.extend(self.nodes[n].children.iter().rev().copied());
        }
        out
    }

    /// The nearest ancestor element with the given tag name, excluding the
    /// node itself.
    pub fn nearest_ancestor(&self, id: NodeId, tag: &str) -> Option<NodeId> {
        let mut cur = self.nodes[id].parent;
        while let Some(p) = cur {
            if self.element(p).map_or(false, |e| e.name == tag) {
                return Some(p);
            }
            cur = self.nodes[p].parent;
        }
        None
    }
}

fn element_from_start(e: &BytesStart) -> Result<Element, String> {
    let name = String::from_utf8_lossy(e.name().as_ref()).to_lowercase();
    let mut attrs = Vec::new();
    // html_attributes tolerates unquoted and valueless attributes.
    for attr in e.html_attributes() {
        let attr = match attr {
            Ok(a) => a,
            Err(e) => {
                return Err(format!("Error parsing an attribute on <{}>—{}", name, e));
            }
        };
        attrs.push((
            String::from_utf8_lossy(attr.key.as_ref()).to_lowercase(),
            String::from_utf8_lossy(&attr.value).into_owned(),
        ));
    }
    Ok(Element {
        name,
        attrs,
        self_closing: false,
    })
}
