//! Minimal SOAP 1.1 envelope support for the legacy RP generations.

mod config;
mod de;
mod ser;
#[cfg(test)]
mod tests;

pub use config::XmlConfig;
pub use de::from_str;
pub use ser::to_string;

use serde::{Deserialize, Serialize};

pub mod ns {
    pub const SOAP_ENV: &str = "http://schemas.xmlsoap.org/soap/envelope/";
    pub const RP: &str = "http://bankid.com/RpService/v4.0.0/types/";
}

pub mod prefix {
    pub const SOAP_ENV: &str = "soapenv";
    /// The RpService types live in the default namespace of the envelope.
    pub const RP: &str = "";
}

/// A SOAP envelope
///
/// Deserialization accepts any envelope prefix (`soapenv:`, `soap:` or
/// none); header elements are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    #[serde(rename = "Body")]
    body: Body<T>,
}

impl<T> Envelope<T> {
    /// Creates a new envelope with the given body
    pub fn new(body: T) -> Self {
        Self {
            body: Body { content: body },
        }
    }

    /// Returns the body of the envelope
    pub fn body(&self) -> &T {
        &self.body.content
    }

    /// Consumes the envelope and returns the body
    pub fn into_body(self) -> T {
        self.body.content
    }
}

impl<T: for<'a> Deserialize<'a>> Envelope<T> {
    /// Parse the envelope from a SOAP payload
    pub fn parse(xml: &str) -> Result<Self, quick_xml::DeError> {
        from_str(xml)
    }
}

impl<T: Serialize> Envelope<T> {
    /// Serialize this envelope into a SOAP string with optional pretty printing.
    ///
    /// The envelope carries the `soapenv` prefix; the RpService types
    /// namespace is declared as the default namespace so the operation
    /// elements stay unprefixed.
    pub fn serialize_soap(&self, pretty: bool) -> Result<String, quick_xml::SeError> {
        let conf = if pretty {
            XmlConfig::new().pretty(true)
        } else {
            XmlConfig::default()
        };
        let config = conf
            .namespace(prefix::SOAP_ENV, ns::SOAP_ENV)
            .namespace(prefix::RP, ns::RP);

        let env = SoapEnvRef(self);
        to_string(&config, &env)
    }
}

/// Represents a SOAP body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Body<T> {
    #[serde(rename = "$value")]
    pub content: T,
}

struct SoapEnvRef<'a, T>(&'a Envelope<T>);

impl<T> Serialize for SoapEnvRef<'_, T>
where
    T: Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("soapenv:Envelope", 1)?;
        state.serialize_field("soapenv:Body", self.0.body())?;
        state.end()
    }
}
