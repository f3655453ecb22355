use std::collections::BTreeMap;

/// Configuration for XML serialization
#[derive(Debug, Clone)]
pub struct XmlConfig {
    pub pretty: bool,
    pub indent: (char, usize),
    pub xml_decl: bool,
    pub namespaces: BTreeMap<String, String>,
}

impl Default for XmlConfig {
    fn default() -> Self {
        Self {
            pretty: false,
            indent: (' ', 2),
            xml_decl: true,
            namespaces: BTreeMap::new(),
        }
    }
}

impl XmlConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set this flag to true to enable pretty printing. Default is false.
    pub fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Set this flag to true to include the XML declaration. Default is true.
    pub fn xml_decl(mut self, decl: bool) -> Self {
        self.xml_decl = decl;
        self
    }

    /// Add a namespace declaration to the document root. An empty prefix
    /// declares the default namespace.
    pub fn namespace<S: ToString>(mut self, prefix: S, uri: S) -> Self {
        self.namespaces.insert(prefix.to_string(), uri.to_string());
        self
    }
}
