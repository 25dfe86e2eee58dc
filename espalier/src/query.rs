use serde_json::{Map, Value};
use std::{
    collections::BTreeMap,
    fmt::{self, Debug, Formatter},
    sync::Arc,
};
use url::form_urlencoded;

const PARAMETER_LIMIT: usize = 1000;
const DEPTH: usize = 5;
const ARRAY_LIMIT: usize = 20;

type ParseFn = Arc<dyn Fn(&str) -> Map<String, Value> + Send + Sync + 'static>;

#[derive(Clone, Default)]
enum Mode {
    #[default]
    Simple,
    Extended,
    Disabled,
    Custom(ParseFn),
}

/**
A compiled query string parser.

The simple parser produces a flat map where repeated keys collect
into an array. The extended parser additionally understands bracket
notation, so `a[b]=1&c[]=2` becomes `{"a": {"b": "1"}, "c": ["2"]}`.

```
# use espalier::QueryParser;
# use serde_json::json;
let simple = QueryParser::simple().parse("a=1&a=2&b=3");
assert_eq!(simple["a"], json!(["1", "2"]));

let extended = QueryParser::extended().parse("user[name]=tobi&tags[]=x");
assert_eq!(extended["user"], json!({"name": "tobi"}));
assert_eq!(extended["tags"], json!(["x"]));
```
*/
#[derive(Clone, Default)]
pub struct QueryParser(Mode);

impl Debug for QueryParser {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mode = match &self.0 {
            Mode::Simple => "Simple",
            Mode::Extended => "Extended",
            Mode::Disabled => "Disabled",
            Mode::Custom(_) => "Custom",
        };
        f.debug_tuple("QueryParser").field(&format_args!("{mode}")).finish()
    }
}

impl QueryParser {
    /// the flat parser
    pub fn simple() -> Self {
        Self(Mode::Simple)
    }

    /// the bracket-aware nested parser
    pub fn extended() -> Self {
        Self(Mode::Extended)
    }

    /// a parser that always yields an empty map
    pub fn disabled() -> Self {
        Self(Mode::Disabled)
    }

    /// a parser backed by an arbitrary function
    pub fn custom<F>(parse: F) -> Self
    where
        F: Fn(&str) -> Map<String, Value> + Send + Sync + 'static,
    {
        Self(Mode::Custom(Arc::new(parse)))
    }

    /// parses a raw query string, without its leading `?`
    pub fn parse(&self, querystring: &str) -> Map<String, Value> {
        match &self.0 {
            Mode::Simple => parse_simple(querystring),
            Mode::Extended => parse_extended(querystring),
            Mode::Disabled => Map::new(),
            Mode::Custom(parse) => parse(querystring),
        }
    }
}

fn parse_simple(querystring: &str) -> Map<String, Value> {
    let mut map = Map::new();
    for (key, value) in form_urlencoded::parse(querystring.as_bytes()).take(PARAMETER_LIMIT) {
        let value = Value::String(value.into_owned());
        match map.get_mut(&*key) {
            Some(Value::Array(values)) => values.push(value),
            Some(existing) => {
                let previous = existing.take();
                *existing = Value::Array(vec![previous, value]);
            }
            None => {
                map.insert(key.into_owned(), value);
            }
        }
    }
    map
}

#[derive(Debug)]
enum Node {
    Leaf(String),
    Flag,
    List(Vec<Node>),
    Indexed(BTreeMap<usize, Node>),
    Map(BTreeMap<String, Node>),
}

impl Node {
    fn into_value(self) -> Value {
        match self {
            Node::Leaf(value) => Value::String(value),
            Node::Flag => Value::Bool(true),
            Node::List(items) => Value::Array(items.into_iter().map(Node::into_value).collect()),
            Node::Indexed(items) => {
                Value::Array(items.into_values().map(Node::into_value).collect())
            }
            Node::Map(entries) => Value::Object(
                entries
                    .into_iter()
                    .map(|(key, node)| (key, node.into_value()))
                    .collect(),
            ),
        }
    }

    fn into_items(self) -> Vec<Node> {
        match self {
            Node::List(items) => items,
            Node::Indexed(items) => items.into_values().collect(),
            other => vec![other],
        }
    }

    fn into_entries(self) -> BTreeMap<String, Node> {
        match self {
            Node::Map(entries) => entries,
            Node::Indexed(items) => items
                .into_iter()
                .map(|(index, node)| (index.to_string(), node))
                .collect(),
            other => other
                .into_items()
                .into_iter()
                .enumerate()
                .map(|(index, node)| (index.to_string(), node))
                .collect(),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Segment<'a> {
    Key(&'a str),
    Push,
    Index(usize),
}

impl<'a> Segment<'a> {
    fn classify(inner: &'a str) -> Self {
        if inner.is_empty() {
            return Segment::Push;
        }

        let canonical = inner.bytes().all(|byte| byte.is_ascii_digit())
            && (inner == "0" || !inner.starts_with('0'));

        match inner.parse::<usize>() {
            Ok(index) if canonical && index <= ARRAY_LIMIT => Segment::Index(index),
            _ => Segment::Key(inner),
        }
    }
}

// the byte range of the next `[...]` group at or after `from` that
// contains no nested brackets
fn next_group(key: &str, from: usize) -> Option<(usize, usize)> {
    let mut search = from;
    loop {
        let open = search + key[search..].find('[')?;
        let inner_start = open + 1;
        let offset = key[inner_start..].find(['[', ']'])?;
        if key.as_bytes()[inner_start + offset] == b']' {
            return Some((open, inner_start + offset + 1));
        }
        search = inner_start + offset;
    }
}

fn split_key(key: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut group = next_group(key, 0);

    let parent = group.map_or(key, |(start, _)| &key[..start]);
    if !parent.is_empty() {
        segments.push(Segment::Key(parent));
    }

    let mut depth = 0;
    while let Some((start, end)) = group {
        if depth == DEPTH {
            segments.push(Segment::Key(&key[start..]));
            break;
        }
        segments.push(Segment::classify(&key[start + 1..end - 1]));
        depth += 1;
        group = next_group(key, end);
    }

    segments
}

fn build(segments: &[Segment<'_>], leaf: Node) -> Node {
    segments
        .iter()
        .rev()
        .fold(leaf, |child, segment| match segment {
            Segment::Push => Node::List(vec![child]),
            Segment::Index(index) => Node::Indexed(BTreeMap::from([(*index, child)])),
            Segment::Key(key) => Node::Map(BTreeMap::from([(key.to_string(), child)])),
        })
}

fn merge_key(target: &mut BTreeMap<String, Node>, key: String, value: Node) {
    let merged = match target.remove(&key) {
        Some(existing) => merge(existing, value),
        None => value,
    };
    target.insert(key, merged);
}

fn merge_entries(mut target: BTreeMap<String, Node>, source: Node) -> BTreeMap<String, Node> {
    match source {
        Node::Leaf(key) => {
            target.insert(key, Node::Flag);
        }
        Node::Flag => {}
        source => {
            for (key, value) in source.into_entries() {
                merge_key(&mut target, key, value);
            }
        }
    }
    target
}

fn push_indexed(items: &mut BTreeMap<usize, Node>, value: Node) {
    let next = items.keys().next_back().map_or(0, |last| last + 1);
    items.insert(next, value);
}

fn merge(target: Node, source: Node) -> Node {
    match (target, source) {
        (Node::Map(target), source) => Node::Map(merge_entries(target, source)),

        (target @ (Node::List(_) | Node::Indexed(_)), source @ Node::Map(_)) => {
            Node::Map(merge_entries(target.into_entries(), source))
        }

        (Node::Indexed(mut target), Node::Indexed(source)) => {
            for (index, value) in source {
                match target.remove(&index) {
                    Some(Node::Map(existing)) if matches!(value, Node::Map(_)) => {
                        target.insert(index, Node::Map(merge_entries(existing, value)));
                    }
                    Some(existing) => {
                        target.insert(index, existing);
                        push_indexed(&mut target, value);
                    }
                    None => {
                        target.insert(index, value);
                    }
                }
            }
            Node::Indexed(target)
        }

        (target @ (Node::List(_) | Node::Indexed(_)), source @ (Node::List(_) | Node::Indexed(_))) => {
            let mut items = target.into_items();
            items.extend(source.into_items());
            Node::List(items)
        }

        (Node::List(mut items), scalar) => {
            items.push(scalar);
            Node::List(items)
        }

        (Node::Indexed(mut items), scalar) => {
            push_indexed(&mut items, scalar);
            Node::Indexed(items)
        }

        (scalar, source @ (Node::List(_) | Node::Indexed(_))) => {
            let mut items = vec![scalar];
            items.extend(source.into_items());
            Node::List(items)
        }

        (scalar, source) => Node::List(vec![scalar, source]),
    }
}

fn parse_extended(querystring: &str) -> Map<String, Value> {
    let mut root = BTreeMap::new();

    for (key, value) in form_urlencoded::parse(querystring.as_bytes()).take(PARAMETER_LIMIT) {
        let segments = split_key(&key);
        if segments.is_empty() {
            continue;
        }
        let node = build(&segments, Node::Leaf(value.into_owned()));
        root = merge_entries(root, node);
    }

    root.into_iter()
        .map(|(key, node)| (key, node.into_value()))
        .collect()
}
