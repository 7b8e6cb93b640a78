use reqwest::{StatusCode, Url};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use super::{Document, DocumentStore};
use crate::error::{Result, StorageError};

/// Document store backed by the Firestore REST API (v1).
pub struct FirestoreClient {
    base_url: Url,
    project_id: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct FirestoreDocument {
    #[serde(default)]
    fields: Map<String, Value>,
}

impl FirestoreClient {
    pub const DEFAULT_BASE_URL: &'static str = "https://firestore.googleapis.com";
    const DATABASE: &'static str = "(default)";

    pub fn new(base_url: &str, project_id: impl Into<String>) -> Result<Self> {
        let base_url =
            Url::parse(base_url).map_err(|e| StorageError::InvalidUrl(format!("{base_url}: {e}")))?;

        Ok(Self {
            base_url,
            project_id: project_id.into(),
            api_key: None,
            client: reqwest::Client::builder()
                .user_agent(concat!("pokedit/", env!("CARGO_PKG_VERSION")))
                .build()?,
        })
    }

    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key;
        self
    }

    fn document_url(&self, collection: &str, id: &str) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| StorageError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend([
                "v1",
                "projects",
                self.project_id.as_str(),
                "databases",
                Self::DATABASE,
                "documents",
                collection,
                id,
            ]);

        if let Some(key) = &self.api_key {
            url.query_pairs_mut().append_pair("key", key);
        }

        Ok(url)
    }

    /// Document URL with the precondition that makes a PATCH fail instead
    /// of creating a missing document. Without an update mask the PATCH
    /// replaces the whole document.
    fn replace_url(&self, collection: &str, id: &str) -> Result<Url> {
        let mut url = self.document_url(collection, id)?;
        url.query_pairs_mut()
            .append_pair("currentDocument.exists", "true");
        Ok(url)
    }
}

fn replace_body(document: Document) -> FirestoreDocument {
    FirestoreDocument {
        fields: encode_fields(document),
    }
}

#[async_trait::async_trait]
impl DocumentStore for FirestoreClient {
    async fn get_by_id(&self, collection: &str, id: &str) -> Result<Option<Document>> {
        let url = self.document_url(collection, id)?;
        tracing::debug!("Fetching document {}/{}", collection, id);

        let response = self.client.get(url).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(StorageError::from_response(response).await);
        }

        let body = response.json::<FirestoreDocument>().await?;
        Ok(Some(decode_fields(body.fields)))
    }

    async fn replace_by_id(&self, collection: &str, id: &str, document: Document) -> Result<()> {
        let url = self.replace_url(collection, id)?;
        tracing::debug!("Replacing document {}/{}", collection, id);

        let response = self
            .client
            .patch(url)
            .json(&replace_body(document))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(StorageError::from_response(response).await);
        }

        Ok(())
    }
}

/// Converts plain JSON fields into Firestore typed values.
pub fn encode_fields(document: Document) -> Map<String, Value> {
    document
        .into_iter()
        .map(|(name, value)| (name, encode_value(value)))
        .collect()
}

/// Converts Firestore typed values back into plain JSON fields.
pub fn decode_fields(fields: Map<String, Value>) -> Document {
    fields
        .into_iter()
        .map(|(name, value)| (name, decode_value(value)))
        .collect()
}

fn encode_value(value: Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => match n.as_i64() {
            // int64 values travel as decimal strings
            Some(i) => json!({ "integerValue": i.to_string() }),
            None => json!({ "doubleValue": n }),
        },
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => json!({
            "arrayValue": { "values": items.into_iter().map(encode_value).collect::<Vec<_>>() }
        }),
        Value::Object(map) => json!({ "mapValue": { "fields": encode_fields(map) } }),
    }
}

fn decode_value(value: Value) -> Value {
    let Value::Object(mut typed) = value else {
        return Value::Null;
    };

    if let Some(s) = typed.remove("stringValue") {
        return s;
    }
    if let Some(i) = typed.remove("integerValue") {
        return match i {
            Value::String(s) => s.parse::<i64>().map(Value::from).unwrap_or(Value::String(s)),
            other => other,
        };
    }
    if let Some(d) = typed.remove("doubleValue") {
        return d;
    }
    if let Some(b) = typed.remove("booleanValue") {
        return b;
    }
    if let Some(v) = typed
        .remove("timestampValue")
        .or_else(|| typed.remove("referenceValue"))
    {
        return v;
    }
    if let Some(Value::Object(mut array)) = typed.remove("arrayValue") {
        return match array.remove("values") {
            Some(Value::Array(items)) => Value::Array(items.into_iter().map(decode_value).collect()),
            _ => Value::Array(Vec::new()),
        };
    }
    if let Some(Value::Object(mut map)) = typed.remove("mapValue") {
        return match map.remove("fields") {
            Some(Value::Object(fields)) => Value::Object(decode_fields(fields)),
            _ => Value::Object(Map::new()),
        };
    }

    Value::Null
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::test_server::{direct_client, serve_once};

    fn as_document(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    #[test]
    fn test_encode_scalar_fields() {
        let doc = as_document(json!({
            "nomePokemon": "Pikachu",
            "numero": 25,
            "altura": 0.4,
            "shiny": false,
            "imageUri": null
        }));

        let fields = encode_fields(doc);
        assert_eq!(fields["nomePokemon"], json!({ "stringValue": "Pikachu" }));
        assert_eq!(fields["numero"], json!({ "integerValue": "25" }));
        assert_eq!(fields["altura"], json!({ "doubleValue": 0.4 }));
        assert_eq!(fields["shiny"], json!({ "booleanValue": false }));
        assert_eq!(fields["imageUri"], json!({ "nullValue": null }));
    }

    #[test]
    fn test_decode_nested_values() {
        let fields = as_document(json!({
            "evolutions": { "arrayValue": { "values": [
                { "stringValue": "Raichu" }
            ] } },
            "stats": { "mapValue": { "fields": {
                "hp": { "integerValue": "35" }
            } } },
            "empty": { "arrayValue": {} },
            "caught": { "timestampValue": "2024-01-01T00:00:00Z" }
        }));

        let doc = decode_fields(fields);
        assert_eq!(doc["evolutions"], json!(["Raichu"]));
        assert_eq!(doc["stats"], json!({ "hp": 35 }));
        assert_eq!(doc["empty"], json!([]));
        assert_eq!(doc["caught"], json!("2024-01-01T00:00:00Z"));
    }

    #[test]
    fn test_decode_unknown_value_is_null() {
        let fields = as_document(json!({ "odd": { "geoPointValue": {} }, "bare": 3 }));

        let doc = decode_fields(fields);
        assert_eq!(doc["odd"], Value::Null);
        assert_eq!(doc["bare"], Value::Null);
    }

    #[test]
    fn test_document_url_encodes_id() {
        let client = FirestoreClient::new("https://firestore.test/", "pokedex")
            .unwrap()
            .with_api_key(Some("secret".into()));

        let url = client.document_url("tblPokemon", "a/b c").unwrap();
        assert_eq!(
            url.as_str(),
            "https://firestore.test/v1/projects/pokedex/databases/(default)/documents/tblPokemon/a%2Fb%20c?key=secret"
        );
    }

    #[test]
    fn test_replace_url_requires_existing_document() {
        let client = FirestoreClient::new("https://firestore.test", "pokedex")
            .unwrap()
            .with_api_key(Some("secret".into()));

        let url = client.replace_url("tblPokemon", "P001").unwrap();
        assert_eq!(
            url.as_str(),
            "https://firestore.test/v1/projects/pokedex/databases/(default)/documents/tblPokemon/P001?key=secret&currentDocument.exists=true"
        );
    }

    #[test]
    fn test_replace_body_wraps_typed_fields() {
        let body = replace_body(as_document(json!({ "peso": "6.1", "imageUri": null })));

        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({ "fields": {
                "peso": { "stringValue": "6.1" },
                "imageUri": { "nullValue": null }
            } })
        );
    }

    fn local_client(base_url: &str) -> FirestoreClient {
        FirestoreClient {
            client: direct_client(),
            ..FirestoreClient::new(base_url, "pokedex").unwrap()
        }
    }

    #[tokio::test]
    async fn test_get_missing_document_is_none() {
        let (base_url, server) = serve_once(404, r#"{"error":{"status":"NOT_FOUND"}}"#).await;

        let found = local_client(&base_url)
            .get_by_id("tblPokemon", "P404")
            .await
            .unwrap();
        let request = server.await.unwrap();

        assert!(found.is_none());
        assert_eq!(request.method, "GET");
        assert_eq!(
            request.target,
            "/v1/projects/pokedex/databases/(default)/documents/tblPokemon/P404"
        );
    }

    #[tokio::test]
    async fn test_get_decodes_fields() {
        let (base_url, server) = serve_once(
            200,
            r#"{"name":"x","fields":{"nomePokemon":{"stringValue":"Pikachu"},"numero":{"integerValue":"25"}}}"#,
        )
        .await;

        let found = local_client(&base_url)
            .get_by_id("tblPokemon", "P001")
            .await
            .unwrap()
            .unwrap();
        server.await.unwrap();

        assert_eq!(Value::Object(found), json!({ "nomePokemon": "Pikachu", "numero": 25 }));
    }

    #[tokio::test]
    async fn test_get_server_error_is_backend_error() {
        let (base_url, server) = serve_once(500, r#"{"error":"boom"}"#).await;

        let err = local_client(&base_url)
            .get_by_id("tblPokemon", "P001")
            .await
            .unwrap_err();
        server.await.unwrap();

        assert!(matches!(err, StorageError::Backend { status: 500, .. }));
    }

    #[tokio::test]
    async fn test_replace_sends_patch_with_precondition() {
        let (base_url, server) = serve_once(200, r#"{"name":"x","fields":{}}"#).await;

        local_client(&base_url)
            .replace_by_id(
                "tblPokemon",
                "P001",
                as_document(json!({ "peso": "6.1" })),
            )
            .await
            .unwrap();
        let request = server.await.unwrap();

        assert_eq!(request.method, "PATCH");
        assert_eq!(
            request.target,
            "/v1/projects/pokedex/databases/(default)/documents/tblPokemon/P001?currentDocument.exists=true"
        );
        assert_eq!(
            request.json(),
            json!({ "fields": { "peso": { "stringValue": "6.1" } } })
        );
    }

    #[tokio::test]
    async fn test_replace_missing_document_is_not_found() {
        let (base_url, server) = serve_once(404, r#"{"error":{"status":"NOT_FOUND"}}"#).await;

        let err = local_client(&base_url)
            .replace_by_id("tblPokemon", "P404", Document::new())
            .await
            .unwrap_err();
        server.await.unwrap();

        assert!(err.is_not_found());
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            FirestoreClient::new("not a url", "pokedex"),
            Err(StorageError::InvalidUrl(_))
        ));
    }
}
