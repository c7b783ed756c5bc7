//! Board items extractor
//!
//! Pages through `items_page` / `next_items_page` until monday.com stops
//! returning a cursor.

use crate::client::{GraphQl, GraphQlRequest};
use crate::error::FetchError;
use crate::etl::Extractor;

use eyre::{Context, Result};
use owo_colors::OwoColorize;
use serde_json::{Map, Value};

const BOARD_QUERY: &str = r#"
query ($board: [ID!]) {
  boards (ids: $board) {
    items_page {
      cursor
      items {
        id
        name
        column_values {
          id
          text
        }
      }
    }
  }
}
"#;

const NEXT_PAGE_QUERY: &str = r#"
query ($cursor: String!) {
  next_items_page (cursor: $cursor) {
    cursor
    items {
      id
      name
      column_values {
        id
        text
      }
    }
  }
}
"#;

/// Extractor for every item on a monday.com board
///
/// Items are returned as raw JSON so that malformed entries reach the
/// transformer instead of failing the fetch.
///
/// # Example
/// ```no_run
/// use monday_asset_sync::client::MondayClient;
/// use monday_asset_sync::etl::Extractor;
/// use monday_asset_sync::monday::BoardExtractor;
/// use url::Url;
///
/// # async fn example() -> eyre::Result<()> {
/// let url = Url::parse("https://api.monday.com/v2")?;
/// let client = MondayClient::try_new(url, "my-token", None)?;
/// let items = BoardExtractor::new(client, "123456").extract().await?;
/// # Ok(())
/// # }
/// ```
pub struct BoardExtractor<C> {
    client: C,
    board_id: String,
}

impl<C: GraphQl> BoardExtractor<C> {
    pub fn new(client: C, board_id: impl Into<String>) -> Self {
        Self {
            client,
            board_id: board_id.into(),
        }
    }

    /// Fetch the first page of the board
    ///
    /// Returns `None` when the board list comes back empty.
    async fn first_page(&self) -> Result<Option<Page>> {
        let request =
            GraphQlRequest::new(BOARD_QUERY).variable("board", vec![self.board_id.clone()]);
        let response = self
            .client
            .execute(&request)
            .await
            .with_context(|| format!("Failed to fetch board {}", self.board_id))?;

        let boards = match data(response)?.remove("boards") {
            None | Some(Value::Null) => return Ok(None),
            Some(Value::Array(boards)) => boards,
            Some(other) => {
                return Err(FetchError::UnexpectedShape(format!("boards: {}", other)).into());
            }
        };

        match boards.into_iter().next() {
            None => Ok(None),
            Some(mut board) => {
                let items_page = board
                    .get_mut("items_page")
                    .map(Value::take)
                    .unwrap_or_else(empty);
                Page::from_value(normalize_page(items_page)?).map(Some)
            }
        }
    }

    /// Fetch the page following `cursor`
    async fn next_page(&self, cursor: &str) -> Result<Page> {
        let request = GraphQlRequest::new(NEXT_PAGE_QUERY).variable("cursor", cursor);
        let response = self
            .client
            .execute(&request)
            .await
            .with_context(|| format!("Failed to fetch page after cursor {}", cursor))?;

        let next = data(response)?
            .remove("next_items_page")
            .unwrap_or_else(empty);
        Page::from_value(normalize_page(next)?)
    }
}

impl<C: GraphQl> Extractor for BoardExtractor<C> {
    type Item = Value;

    async fn extract(&self) -> Result<Vec<Self::Item>> {
        log::debug!("Fetching items for board {}", self.board_id.cyan());

        let Some(first) = self.first_page().await? else {
            log::warn!("Board {} returned no boards", self.board_id.cyan());
            return Ok(Vec::new());
        };

        let mut items = first.items;
        let mut cursor = first.cursor;
        let mut pages = 1;

        while let Some(current) = cursor {
            let page = self.next_page(&current).await?;
            pages += 1;
            log::debug!("Page {}: {} items", pages, page.items.len());
            items.extend(page.items);
            cursor = page.cursor;
        }

        log::info!(
            "Total items retrieved: {} ({} pages)",
            items.len().bright_white(),
            pages
        );
        Ok(items)
    }
}

/// One page of items plus the cursor to the next one
#[derive(Debug, Default, PartialEq)]
struct Page {
    cursor: Option<String>,
    items: Vec<Value>,
}

impl Page {
    fn from_value(mut page: Map<String, Value>) -> Result<Self> {
        let cursor = match page.remove("cursor") {
            Some(Value::String(c)) if !c.is_empty() => Some(c),
            _ => None,
        };
        let items = match page.remove("items") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items,
            Some(other) => {
                return Err(FetchError::UnexpectedShape(format!("items: {}", other)).into());
            }
        };
        Ok(Self { cursor, items })
    }
}

/// The `data` object of a GraphQL response; absent data reads as empty
fn data(response: Value) -> Result<Map<String, Value>> {
    let mut response = match response {
        Value::Object(response) => response,
        other => return Err(FetchError::UnexpectedShape(format!("response: {}", other)).into()),
    };
    match response.remove("data") {
        None => Ok(Map::new()),
        Some(Value::Object(data)) => Ok(data),
        Some(other) => Err(FetchError::UnexpectedShape(format!("data: {}", other)).into()),
    }
}

fn empty() -> Value {
    Value::Object(Map::new())
}

/// Coerce a page payload into an object
///
/// monday.com has been seen to wrap the page in a one-element list. A list is
/// unwrapped to its first element and an empty list is an empty page.
fn normalize_page(payload: Value) -> Result<Map<String, Value>> {
    let payload = match payload {
        Value::Array(list) => list.into_iter().next().unwrap_or_else(empty),
        other => other,
    };
    match payload {
        Value::Object(page) => Ok(page),
        Value::Null => Err(FetchError::UnexpectedShape("null page".to_string()).into()),
        other => Err(FetchError::UnexpectedShape(other.to_string()).into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Answers queries from a fixed list of responses and records requests
    struct ScriptedApi {
        responses: Mutex<VecDeque<Value>>,
        requests: Mutex<Vec<GraphQlRequest>>,
    }

    impl ScriptedApi {
        fn new(responses: Vec<Value>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                requests: Mutex::new(Vec::new()),
            }
        }
    }

    impl GraphQl for ScriptedApi {
        async fn execute(&self, request: &GraphQlRequest) -> Result<Value> {
            self.requests.lock().unwrap().push(request.clone());
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| eyre::eyre!("no scripted response left"))
        }
    }

    fn items(prefix: &str, count: usize) -> Vec<Value> {
        (0..count)
            .map(|i| json!({"id": format!("{}{}", prefix, i), "name": "x", "column_values": []}))
            .collect()
    }

    fn first(items: Vec<Value>, cursor: Option<&str>) -> Value {
        json!({"data": {"boards": [{"items_page": {"cursor": cursor, "items": items}}]}})
    }

    fn next(payload: Value) -> Value {
        json!({"data": {"next_items_page": payload}})
    }

    #[tokio::test]
    async fn test_single_page() {
        let api = ScriptedApi::new(vec![first(items("a", 3), None)]);
        let extractor = BoardExtractor::new(api, "42");
        let result = extractor.extract().await.unwrap();
        assert_eq!(result.len(), 3);

        let requests = extractor.client.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].variables["board"], json!(["42"]));
    }

    #[tokio::test]
    async fn test_follows_cursor_across_payload_shapes() {
        let api = ScriptedApi::new(vec![
            first(items("a", 2), Some("c1")),
            next(json!([{"cursor": "c2", "items": items("b", 2)}])),
            next(json!({"cursor": null, "items": items("c", 1)})),
        ]);
        let extractor = BoardExtractor::new(api, "42");
        let result = extractor.extract().await.unwrap();
        assert_eq!(result.len(), 5);
        assert_eq!(result[4]["id"], "c0");

        let requests = extractor.client.requests.lock().unwrap();
        assert_eq!(requests[1].variables["cursor"], "c1");
        assert_eq!(requests[2].variables["cursor"], "c2");
    }

    #[tokio::test]
    async fn test_empty_list_payload_ends_pagination() {
        let api = ScriptedApi::new(vec![first(items("a", 1), Some("c1")), next(json!([]))]);
        let result = BoardExtractor::new(api, "42").extract().await.unwrap();
        assert_eq!(result.len(), 1);
    }

    #[tokio::test]
    async fn test_empty_cursor_stops() {
        let api = ScriptedApi::new(vec![first(items("a", 2), Some(""))]);
        let result = BoardExtractor::new(api, "42").extract().await.unwrap();
        assert_eq!(result.len(), 2);
    }

    #[tokio::test]
    async fn test_no_boards() {
        let api = ScriptedApi::new(vec![json!({"data": {"boards": []}})]);
        let result = BoardExtractor::new(api, "42").extract().await.unwrap();
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_unexpected_page_shape() {
        let api = ScriptedApi::new(vec![first(items("a", 1), Some("c1")), next(json!("oops"))]);
        let err = BoardExtractor::new(api, "42").extract().await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<FetchError>(),
            Some(FetchError::UnexpectedShape(_))
        ));
    }

    #[tokio::test]
    async fn test_items_not_a_list() {
        let api = ScriptedApi::new(vec![json!({"data": {"boards": [{"items_page": {"items": {"id": "1"}}}]}})]);
        let err = BoardExtractor::new(api, "42").extract().await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<FetchError>(),
            Some(FetchError::UnexpectedShape(_))
        ));
    }

    #[tokio::test]
    async fn test_transport_error_aborts() {
        let api = ScriptedApi::new(vec![first(items("a", 1), Some("c1"))]);
        assert!(BoardExtractor::new(api, "42").extract().await.is_err());
    }

    #[test]
    fn test_normalize_page() {
        assert_eq!(normalize_page(json!([])).unwrap(), Map::new());
        assert_eq!(
            normalize_page(json!([{"cursor": "x"}, {"cursor": "y"}])).unwrap()["cursor"],
            "x"
        );
        assert!(normalize_page(json!(null)).is_err());
        assert!(normalize_page(json!(5)).is_err());
    }
}
