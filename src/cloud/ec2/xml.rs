use crate::error::CloudError;
use crate::instances::InstanceState;

pub(super) fn extract_xml_tag(block: &str, tag: &str) -> Option<String> {
    let open = format!("<{tag}>");
    let close = format!("</{tag}>");
    let start = block.find(&open)? + open.len();
    let rest = &block[start..];
    let end = rest.find(&close)?;
    Some(decode_entities(rest[..end].trim()))
}

fn decode_entities(raw: &str) -> String {
    raw.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

/// State of the first instance in a `DescribeInstances` response.
pub(super) fn parse_instance_state(xml: &str, instance_id: &str) -> Result<InstanceState, CloudError> {
    let block = extract_xml_tag(xml, "instanceState").ok_or_else(|| {
        CloudError::MalformedResponse(format!("no instanceState for {instance_id}"))
    })?;
    let name = extract_xml_tag(&block, "name").ok_or_else(|| {
        CloudError::MalformedResponse(format!("instanceState without name for {instance_id}"))
    })?;
    Ok(InstanceState::parse(&name))
}

/// `Code` and `Message` from an EC2 error document.
pub(super) fn parse_error(xml: &str) -> Option<(String, String)> {
    let error = extract_xml_tag(xml, "Error")?;
    let code = extract_xml_tag(&error, "Code")?;
    let message = extract_xml_tag(&error, "Message").unwrap_or_default();
    Some((code, message))
}
