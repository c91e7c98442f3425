//! SOAP 1.1 envelope encoding and response decoding.
//!
//! Only the subset the luXew service needs: RPC-style requests with string
//! parameters, and responses decoded into a [`SoapValue`] tree without any
//! schema knowledge.

use anyhow::{anyhow, bail, Context, Result};
use quick_xml::{
    escape::escape,
    events::{BytesStart, Event},
    Reader,
};
use shared::protocol::SoapValue;

pub const SOAP_ENV_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct XmlElement {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<XmlElement>,
    text: String,
}

impl XmlElement {
    fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    fn child(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find(|child| child.name == name)
    }

    fn find_descendant(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find_map(|child| {
            if child.name == name {
                Some(child)
            } else {
                child.find_descendant(name)
            }
        })
    }

    fn is_nil(&self) -> bool {
        matches!(self.attr("nil"), Some("true" | "1"))
    }

    fn xsi_type(&self) -> Option<&str> {
        self.attr("type")
            .map(|ty| ty.rsplit(':').next().unwrap_or(ty))
    }

    fn is_encoded_array(&self) -> bool {
        self.attr("arrayType").is_some() || self.xsi_type() == Some("Array")
    }

    fn is_apache_map(&self) -> bool {
        self.xsi_type() == Some("Map")
    }
}

fn parse_document(xml: &str) -> Result<XmlElement> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root = None;
    loop {
        match reader.read_event().context("malformed XML")? {
            Event::Start(start) => stack.push(element_from_start(&start)?),
            Event::Empty(start) => {
                let element = element_from_start(&start)?;
                attach(&mut stack, &mut root, element);
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| anyhow!("malformed XML: unbalanced closing tag"))?;
                attach(&mut stack, &mut root, element);
            }
            Event::Text(text) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&text.unescape().context("malformed XML text")?);
                }
            }
            Event::CData(data) => {
                if let Some(current) = stack.last_mut() {
                    current
                        .text
                        .push_str(&String::from_utf8_lossy(&data.into_inner()));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !stack.is_empty() {
        bail!("malformed XML: unclosed element <{}>", stack[stack.len() - 1].name);
    }
    root.ok_or_else(|| anyhow!("empty XML document"))
}

fn element_from_start(start: &BytesStart<'_>) -> Result<XmlElement> {
    let mut element = XmlElement {
        name: String::from_utf8_lossy(start.local_name().as_ref()).into_owned(),
        ..XmlElement::default()
    };
    for attribute in start.attributes() {
        let attribute = attribute.context("malformed XML attribute")?;
        let key = String::from_utf8_lossy(attribute.key.local_name().as_ref()).into_owned();
        let value = attribute
            .unescape_value()
            .context("malformed XML attribute value")?
            .into_owned();
        element.attributes.push((key, value));
    }
    Ok(element)
}

fn attach(stack: &mut [XmlElement], root: &mut Option<XmlElement>, element: XmlElement) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None => {
            if root.is_none() {
                *root = Some(element);
            }
        }
    }
}

fn element_value(element: &XmlElement) -> SoapValue {
    if element.is_nil() {
        return SoapValue::Absent;
    }
    if element.is_encoded_array() {
        return SoapValue::List(element.children.iter().map(element_value).collect());
    }
    if element.is_apache_map() {
        return map_value(element);
    }
    if element.children.is_empty() {
        return if element.text.is_empty() {
            SoapValue::Absent
        } else {
            SoapValue::Text(element.text.clone())
        };
    }

    let mut grouped: Vec<(String, Vec<SoapValue>)> = Vec::new();
    for child in &element.children {
        let value = element_value(child);
        match grouped.iter_mut().find(|(name, _)| *name == child.name) {
            Some((_, values)) => values.push(value),
            None => grouped.push((child.name.clone(), vec![value])),
        }
    }
    SoapValue::Record(
        grouped
            .into_iter()
            .map(|(name, mut values)| {
                let value = if values.len() == 1 {
                    values.remove(0)
                } else {
                    SoapValue::List(values)
                };
                (name, value)
            })
            .collect(),
    )
}

/// Apache SOAP maps: `<item><key>k</key><value>v</value></item>`.
fn map_value(element: &XmlElement) -> SoapValue {
    let fields = element
        .children
        .iter()
        .filter_map(|item| {
            let key = item.child("key")?.text.clone();
            let value = item
                .child("value")
                .map(element_value)
                .unwrap_or(SoapValue::Absent);
            Some((key, value))
        })
        .collect();
    SoapValue::Record(fields)
}

/// Builds an RPC-style request envelope for `operation`.
pub fn encode_request(namespace: &str, operation: &str, args: &[(&str, String)]) -> String {
    let mut parts = String::new();
    for (name, value) in args {
        parts.push_str(&format!("<{name}>{}</{name}>", escape(value.as_str())));
    }
    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8"?>"#,
            r#"<SOAP-ENV:Envelope xmlns:SOAP-ENV="{env}" xmlns:ns1="{ns}">"#,
            "<SOAP-ENV:Body><ns1:{op}>{parts}</ns1:{op}></SOAP-ENV:Body>",
            "</SOAP-ENV:Envelope>"
        ),
        env = SOAP_ENV_NS,
        ns = escape(namespace),
        op = operation,
        parts = parts,
    )
}

/// Decodes a response envelope into its result value. Faults become errors
/// carrying the fault text so the classifier can inspect it.
pub fn decode_response(xml: &str) -> Result<SoapValue> {
    let root = parse_document(xml)?;
    if root.name != "Envelope" {
        bail!("not a SOAP envelope: root element is <{}>", root.name);
    }
    let body = root
        .child("Body")
        .ok_or_else(|| anyhow!("SOAP envelope has no Body"))?;
    let Some(response) = body.children.first() else {
        return Ok(SoapValue::Absent);
    };

    if response.name == "Fault" {
        bail!("SOAP fault: {}", fault_text(response));
    }

    match element_value(response) {
        SoapValue::Record(mut fields)
            if fields.len() == 1 && matches!(fields[0].0.as_str(), "return" | "result") =>
        {
            Ok(fields.remove(0).1)
        }
        value => Ok(value),
    }
}

fn fault_text(fault: &XmlElement) -> String {
    let soap11 = fault.child("faultstring").map(|el| el.text.clone());
    let soap12 = fault
        .child("Reason")
        .and_then(|reason| reason.child("Text"))
        .map(|el| el.text.clone());
    soap11
        .or(soap12)
        .filter(|text| !text.is_empty())
        .unwrap_or_else(|| "unspecified server fault".to_string())
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WsdlBinding {
    pub address: Option<String>,
    pub namespace: Option<String>,
}

/// Pulls the service address and target namespace out of a WSDL document.
pub fn parse_wsdl(xml: &str) -> Result<WsdlBinding> {
    let root = parse_document(xml)?;
    if root.name != "definitions" {
        bail!("not a WSDL document: root element is <{}>", root.name);
    }
    Ok(WsdlBinding {
        address: root
            .find_descendant("address")
            .and_then(|address| address.attr("location"))
            .map(str::to_string),
        namespace: root.attr("targetNamespace").map(str::to_string),
    })
}

#[cfg(test)]
#[path = "tests/soap_tests.rs"]
mod tests;
