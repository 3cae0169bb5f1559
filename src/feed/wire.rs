//! JSON shape of a feed page.
//!
//! ```json
//! { "nodes": [ { "node": { "nid": "12", "title": "Cat nap", "ImageStyle_thumbnail": "/t/12.jpg" } } ] }
//! ```

use serde::{Deserialize, Deserializer};

use super::{FeedError, Item};

#[derive(Debug, Deserialize)]
struct PageBody {
    nodes: Vec<NodeEnvelope>,
}

#[derive(Debug, Deserialize)]
struct NodeEnvelope {
    node: Node,
}

#[derive(Debug, Deserialize)]
struct Node {
    #[serde(deserialize_with = "string_or_number")]
    nid: String,
    #[serde(default)]
    title: String,
    #[serde(rename = "ImageStyle_thumbnail", default)]
    thumbnail: String,
}

impl From<Node> for Item {
    fn from(node: Node) -> Self {
        Self {
            id: node.nid,
            title: node.title,
            thumbnail_url: node.thumbnail,
        }
    }
}

/// Path of feed page `page` relative to the base URL.
pub fn page_path(page: u32) -> String {
    format!("/app-api/v1/photo-gallery-feed-page/page/{page}")
}

/// Decode a feed page body into items, preserving server order.
///
/// # Errors
/// Returns [`FeedError::Decode`] when the body is not JSON, lacks `nodes`, or
/// a node lacks `nid`.
pub fn decode_page(body: &[u8]) -> Result<Vec<Item>, FeedError> {
    let page: PageBody =
        serde_json::from_slice(body).map_err(|err| FeedError::Decode(err.to_string()))?;
    Ok(page.nodes.into_iter().map(|env| env.node.into()).collect())
}

// Some feed exports emit `nid` as a bare integer.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(u64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(text) => text,
        Raw::Number(n) => n.to_string(),
    })
}
