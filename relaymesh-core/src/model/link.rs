use crate::error::ProtocolError;
use crate::model::room::RoomId;
use url::Url;

const ROOM_QUERY_KEY: &str = "room";

/// Builds the shareable `{origin}{path}?room={id}` links used for both
/// "create" and "invite".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomLinkTemplate {
    origin: String,
    path: String,
}

impl RoomLinkTemplate {
    pub fn new(origin: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            path: path.into(),
        }
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn link_for(&self, room: &RoomId) -> String {
        format!("{}{}?{}={}", self.origin, self.path, ROOM_QUERY_KEY, room)
    }

    /// A fresh room id and its share link. Nothing is sent.
    pub fn create(&self) -> (RoomId, String) {
        let room = RoomId::generate();
        let link = self.link_for(&room);
        (room, link)
    }

    /// Extracts the room id from a link produced by [`RoomLinkTemplate::link_for`].
    pub fn parse_room(link: &str) -> Result<RoomId, ProtocolError> {
        let url = Url::parse(link).map_err(|e| ProtocolError::InvalidLink {
            link: link.to_owned(),
            reason: e.to_string(),
        })?;

        url.query_pairs()
            .find(|(key, value)| key == ROOM_QUERY_KEY && !value.is_empty())
            .map(|(_, value)| RoomId::from(value.into_owned()))
            .ok_or_else(|| ProtocolError::InvalidLink {
                link: link.to_owned(),
                reason: "missing room parameter".to_owned(),
            })
    }

    /// Accepts either a full join link or a bare room id.
    pub fn resolve(input: &str) -> Result<RoomId, ProtocolError> {
        let input = input.trim();
        if input.contains("://") {
            Self::parse_room(input)
        } else if input.is_empty() {
            Err(ProtocolError::InvalidLink {
                link: input.to_owned(),
                reason: "empty room id".to_owned(),
            })
        } else {
            Ok(RoomId::from(input))
        }
    }
}

impl Default for RoomLinkTemplate {
    fn default() -> Self {
        Self::new("http://127.0.0.1:5173", "/")
    }
}
