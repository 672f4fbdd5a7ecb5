use std::collections::HashSet;
use uuid::Uuid;

/// Prefix of the feature collection id (`gml:id` of the root).
pub const DOCUMENT_ID_PREFIX: &str = "GML_";
/// Prefix of record and geometry ids.
pub const RECORD_ID_PREFIX: &str = "ID_";

/// Hands out random `gml:id` values, never the same one twice.
///
/// Ids have to start with a letter to be valid `xs:ID` values, hence the
/// prefixes in front of the UUID.
#[derive(Debug, Default)]
pub struct IdGenerator {
    issued: HashSet<String>,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remembers ids already present so they are not reissued.
    pub fn reserve(&mut self, id: impl Into<String>) {
        self.issued.insert(id.into());
    }

    pub fn document_id(&mut self) -> String {
        self.next_with_prefix(DOCUMENT_ID_PREFIX)
    }

    pub fn record_id(&mut self) -> String {
        self.next_with_prefix(RECORD_ID_PREFIX)
    }

    fn next_with_prefix(&mut self, prefix: &str) -> String {
        loop {
            let id = format!("{prefix}{}", Uuid::new_v4());
            if self.issued.insert(id.clone()) {
                return id;
            }
        }
    }
}

/// Local `xlink:href` pointing at a `gml:id`.
pub fn href(id: &str) -> String {
    format!("#{id}")
}
