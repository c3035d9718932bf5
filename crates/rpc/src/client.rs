//! RPC client: session handling plus the generic model operations.
//!
//! [`OdooClient`] owns one [`Session`] and one [`Transport`]. Every
//! operation is awaited to completion before the next can start; the
//! `&mut self` receivers make concurrent use of one client impossible.

use std::sync::Arc;

use serde_json::{json, Value};

use stockline_core::types::{Domain, Record, RecordId};

use crate::config::{ClientConfig, Credentials};
use crate::envelope::{RemoteError, RpcRequest, RpcResponse, ENDPOINT_AUTHENTICATE, ENDPOINT_CALL_KW};
use crate::error::{RpcError, RpcResult};
use crate::session::Session;
use crate::transport::{HttpTransport, Transport};

/// Keyword arguments and context mappings sent with a model call.
pub type Kwargs = serde_json::Map<String, Value>;

/// JSON-RPC client for one server and one login.
pub struct OdooClient {
    transport: Arc<dyn Transport>,
    credentials: Credentials,
    session: Session,
    max_session_retries: u32,
    next_request_id: u64,
}

impl OdooClient {
    /// Create a client talking HTTP to `config.url`.
    pub fn new(config: &ClientConfig) -> RpcResult<Self> {
        let transport = HttpTransport::new(&config.url, config.request_timeout)?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Create a client over an arbitrary transport.
    pub fn with_transport(config: &ClientConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            credentials: config.credentials(),
            session: Session::default(),
            max_session_retries: config.max_session_retries,
            next_request_id: 0,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    // ---- session ----

    /// Log in and store the returned user id and session id.
    ///
    /// Returns `Ok(true)` on success. A rejected login, or a response
    /// without a user id, fails with [`RpcError::Authentication`].
    pub async fn authenticate(&mut self) -> RpcResult<bool> {
        let params = serde_json::to_value(&self.credentials)
            .map_err(|e| RpcError::InvalidArgument(e.to_string()))?;

        let result = self
            .post(ENDPOINT_AUTHENTICATE, &params)
            .await?
            .into_result()
            .map_err(|e| RpcError::Authentication(e.to_string()))?;

        let uid = result
            .get("uid")
            .and_then(Value::as_i64)
            .ok_or_else(|| RpcError::Authentication("No UID returned".to_string()))?;
        let session_id = result
            .get("session_id")
            .and_then(Value::as_str)
            .map(str::to_string);

        self.session.establish(uid, session_id);
        tracing::info!(uid, db = %self.credentials.db, "Authenticated");
        Ok(true)
    }

    // ---- generic calls ----

    /// Invoke `model.method(*args, **kwargs)` with an empty context.
    pub async fn call_method(
        &mut self,
        model: &str,
        method: &str,
        args: Vec<Value>,
        kwargs: Kwargs,
    ) -> RpcResult<Value> {
        self.call_method_with_context(model, method, args, kwargs, Kwargs::new())
            .await
    }

    /// Invoke `model.method(*args, **kwargs)` under `context`.
    ///
    /// Fails with [`RpcError::NotAuthenticated`] before any request when
    /// no session exists.
    pub async fn call_method_with_context(
        &mut self,
        model: &str,
        method: &str,
        args: Vec<Value>,
        kwargs: Kwargs,
        context: Kwargs,
    ) -> RpcResult<Value> {
        if !self.session.is_authenticated() {
            return Err(RpcError::NotAuthenticated);
        }

        tracing::debug!(model, method, "Calling model method");
        let params = json!({
            "model": model,
            "method": method,
            "args": args,
            "kwargs": kwargs,
            "context": context,
        });

        self.send(ENDPOINT_CALL_KW, params).await
    }

    // ---- reads ----

    /// Read one record, requesting exactly `fields`.
    pub async fn read(&mut self, model: &str, id: RecordId, fields: &[&str]) -> RpcResult<Record> {
        require_fields(fields)?;

        let result = self
            .call_method(model, "read", vec![json!([id])], fields_kwargs(fields))
            .await?;

        into_records(result)?
            .into_iter()
            .next()
            .ok_or_else(|| RpcError::NotFound {
                model: model.to_string(),
                id,
            })
    }

    /// Search `domain` and read the matches, requesting exactly `fields`.
    pub async fn search_read(
        &mut self,
        model: &str,
        domain: &Domain,
        fields: &[&str],
    ) -> RpcResult<Vec<Record>> {
        require_fields(fields)?;

        let result = self
            .call_method(model, "search_read", vec![json!(domain)], fields_kwargs(fields))
            .await?;

        into_records(result)
    }

    /// Read every record matching `domain`, or the whole table when
    /// `domain` is `None`.
    pub async fn read_all(
        &mut self,
        model: &str,
        fields: &[&str],
        domain: Option<&Domain>,
    ) -> RpcResult<Vec<Record>> {
        let everything = Domain::new();
        self.search_read(model, domain.unwrap_or(&everything), fields)
            .await
    }

    /// Field definitions of `model`, keyed by field name.
    pub async fn get_field_definitions(&mut self, model: &str) -> RpcResult<Record> {
        match self
            .call_method(model, "fields_get", Vec::new(), Kwargs::new())
            .await?
        {
            Value::Object(definitions) => Ok(definitions),
            other => Err(RpcError::InvalidResponse(format!(
                "fields_get on {model} returned {other}"
            ))),
        }
    }

    /// Read one record with every field the model defines.
    ///
    /// Inspection only: this bypasses the whitelist discipline and pulls
    /// computed and binary fields. Use [`read`](Self::read) in workflows.
    pub async fn read_all_fields(&mut self, model: &str, id: RecordId) -> RpcResult<Record> {
        let fields = self.all_field_names(model).await?;
        let fields: Vec<&str> = fields.iter().map(String::as_str).collect();
        self.read(model, id, &fields).await
    }

    /// Search and read with every field the model defines.
    ///
    /// Inspection only; see [`read_all_fields`](Self::read_all_fields).
    pub async fn search_read_all_fields(
        &mut self,
        model: &str,
        domain: &Domain,
    ) -> RpcResult<Vec<Record>> {
        let fields = self.all_field_names(model).await?;
        let fields: Vec<&str> = fields.iter().map(String::as_str).collect();
        self.search_read(model, domain, &fields).await
    }

    async fn all_field_names(&mut self, model: &str) -> RpcResult<Vec<String>> {
        Ok(self
            .get_field_definitions(model)
            .await?
            .into_iter()
            .map(|(name, _)| name)
            .collect())
    }

    // ---- writes ----

    /// Write `values` to one record. `true` only if the server answered
    /// exactly `true`.
    pub async fn write(&mut self, model: &str, id: RecordId, values: &Record) -> RpcResult<bool> {
        self.write_many(model, &[id], values).await
    }

    /// Write the same `values` to every record in `ids` in one call.
    pub async fn write_many(
        &mut self,
        model: &str,
        ids: &[RecordId],
        values: &Record,
    ) -> RpcResult<bool> {
        let result = self
            .call_method(
                model,
                "write",
                vec![json!(ids), Value::Object(values.clone())],
                Kwargs::new(),
            )
            .await?;

        Ok(result == Value::Bool(true))
    }

    // ---- private helpers ----

    /// Post `params` to `endpoint`, re-authenticating and retrying when the
    /// server reports an expired session.
    async fn send(&mut self, endpoint: &str, params: Value) -> RpcResult<Value> {
        let mut reauths = 0u32;

        loop {
            let error = match self.post(endpoint, &params).await?.into_result() {
                Ok(result) => return Ok(result),
                Err(error) => error,
            };

            if !error.is_session_expired() || reauths >= self.max_session_retries {
                return Err(remote_failure(error, reauths));
            }

            reauths += 1;
            tracing::warn!(endpoint, attempt = reauths, "Session expired, re-authenticating");
            self.session.invalidate();

            if let Err(source) = self.authenticate().await {
                tracing::error!(error = %source, "Re-authentication failed");
                return Err(RpcError::ReauthFailed {
                    message: error.message,
                    source: Box::new(source),
                });
            }
        }
    }

    /// Wrap `params` in an envelope and post it once.
    async fn post(&mut self, endpoint: &str, params: &Value) -> RpcResult<RpcResponse> {
        self.next_request_id += 1;
        let request = RpcRequest::call(self.next_request_id, params.clone());
        self.transport.post(endpoint, &request).await
    }
}

fn remote_failure(error: RemoteError, reauths: u32) -> RpcError {
    if reauths == 0 {
        RpcError::Remote(error)
    } else {
        RpcError::RemoteAfterReauth(error)
    }
}

fn require_fields(fields: &[&str]) -> RpcResult<()> {
    if fields.is_empty() {
        return Err(RpcError::InvalidArgument(
            "Fields list is required. No default fields will be fetched.".to_string(),
        ));
    }
    Ok(())
}

fn fields_kwargs(fields: &[&str]) -> Kwargs {
    let mut kwargs = Kwargs::new();
    kwargs.insert("fields".to_string(), json!(fields));
    kwargs
}

/// Interpret a read result as a list of records; a falsy result is empty.
fn into_records(result: Value) -> RpcResult<Vec<Record>> {
    match result {
        Value::Null | Value::Bool(false) => Ok(Vec::new()),
        Value::Object(map) if map.is_empty() => Ok(Vec::new()),
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::Object(record) => Ok(record),
                other => Err(RpcError::InvalidResponse(format!(
                    "expected a record object, got {other}"
                ))),
            })
            .collect(),
        other => Err(RpcError::InvalidResponse(format!(
            "expected a list of records, got {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    use crate::testing::{logged_in, test_config, ScriptedTransport};

    fn values(value: Value) -> Record {
        match value {
            Value::Object(map) => map,
            _ => panic!("test values must be an object"),
        }
    }

    // -- authenticate --

    #[tokio::test]
    async fn authenticate_stores_session() {
        let transport = ScriptedTransport::new();
        transport.push_result(json!({"uid": 2, "session_id": "abc"}));
        let mut client = OdooClient::with_transport(&test_config(), transport.clone());

        assert!(client.authenticate().await.unwrap());
        assert_eq!(client.session().uid(), Some(2));
        assert_eq!(client.session().session_id(), Some("abc"));

        let sent = transport.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].endpoint, ENDPOINT_AUTHENTICATE);
        assert_eq!(
            sent[0].request.params,
            json!({"db": "test_db", "login": "admin", "password": "admin"})
        );
    }

    #[tokio::test]
    async fn authenticate_without_uid_fails() {
        let transport = ScriptedTransport::new();
        transport.push_result(json!({"uid": false}));
        let mut client = OdooClient::with_transport(&test_config(), transport);

        assert_matches!(client.authenticate().await, Err(RpcError::Authentication(_)));
        assert!(!client.session().is_authenticated());
    }

    #[tokio::test]
    async fn rejected_login_is_authentication_error() {
        let transport = ScriptedTransport::new();
        transport.push_error("Access Denied");
        let mut client = OdooClient::with_transport(&test_config(), transport);

        assert_matches!(
            client.authenticate().await,
            Err(RpcError::Authentication(msg)) if msg.contains("Access Denied")
        );
    }

    // -- call_method --

    #[tokio::test]
    async fn model_call_requires_session() {
        let transport = ScriptedTransport::new();
        let mut client = OdooClient::with_transport(&test_config(), transport.clone());

        let result = client
            .call_method("stock.picking", "update_salla", vec![json!(1)], Kwargs::new())
            .await;

        assert_matches!(result, Err(RpcError::NotAuthenticated));
        assert!(transport.sent().is_empty());
    }

    #[tokio::test]
    async fn call_method_sends_full_params() {
        let transport = ScriptedTransport::new();
        let mut client = logged_in(&transport).await;
        transport.push_result(json!(null));

        let mut context = Kwargs::new();
        context.insert("skip_sms".into(), json!(true));
        client
            .call_method_with_context(
                "stock.picking",
                "button_validate",
                vec![json!([5])],
                Kwargs::new(),
                context,
            )
            .await
            .unwrap();

        let call = transport.calls().pop().unwrap();
        assert_eq!(call.endpoint, ENDPOINT_CALL_KW);
        assert_eq!(call.request.method, "call");
        assert_eq!(call.request.jsonrpc, "2.0");
        assert_eq!(
            call.request.params,
            json!({
                "model": "stock.picking",
                "method": "button_validate",
                "args": [[5]],
                "kwargs": {},
                "context": {"skip_sms": true},
            })
        );
    }

    #[tokio::test]
    async fn request_ids_increase() {
        let transport = ScriptedTransport::new();
        let mut client = logged_in(&transport).await;
        transport.push_result(json!(true));
        transport.push_result(json!(true));

        client.write("stock.move", 1, &values(json!({"a": 1}))).await.unwrap();
        client.write("stock.move", 2, &values(json!({"a": 1}))).await.unwrap();

        let ids: Vec<u64> = transport.sent().iter().map(|s| s.request.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    // -- reads --

    #[tokio::test]
    async fn read_requests_exact_whitelist_and_passes_record_through() {
        let transport = ScriptedTransport::new();
        let mut client = logged_in(&transport).await;
        transport.push_result(json!([{"id": 9, "name": "P9", "extra": "kept"}]));

        let record = client.read("stock.picking", 9, &["name", "id"]).await.unwrap();

        assert_eq!(record.get("extra"), Some(&json!("kept")));
        let call = transport.calls().pop().unwrap();
        assert_eq!(call.request.params["method"], "read");
        assert_eq!(call.request.params["args"], json!([[9]]));
        assert_eq!(call.request.params["kwargs"], json!({"fields": ["name", "id"]}));
    }

    #[tokio::test]
    async fn empty_whitelist_is_rejected_before_any_request() {
        let transport = ScriptedTransport::new();
        let mut client = logged_in(&transport).await;

        assert_matches!(
            client.read("stock.picking", 1, &[]).await,
            Err(RpcError::InvalidArgument(_))
        );
        assert_matches!(
            client.search_read("stock.move", &Domain::new(), &[]).await,
            Err(RpcError::InvalidArgument(_))
        );
        assert_matches!(
            client.read_all("salla.order.status", &[], None).await,
            Err(RpcError::InvalidArgument(_))
        );
        assert!(transport.calls().is_empty());
    }

    #[tokio::test]
    async fn read_of_missing_id_is_not_found() {
        let transport = ScriptedTransport::new();
        let mut client = logged_in(&transport).await;
        transport.push_result(json!([]));

        assert_matches!(
            client.read("stock.picking", 404, &["id"]).await,
            Err(RpcError::NotFound { id: 404, .. })
        );
    }

    #[tokio::test]
    async fn search_read_sends_domain_and_handles_falsy_result() {
        let transport = ScriptedTransport::new();
        let mut client = logged_in(&transport).await;
        transport.push_result(json!(false));

        let records = client
            .search_read("stock.move", &Domain::ids(&[1, 2]), &["id", "product_qty"])
            .await
            .unwrap();

        assert!(records.is_empty());
        let call = transport.calls().pop().unwrap();
        assert_eq!(call.request.params["method"], "search_read");
        assert_eq!(call.request.params["args"], json!([[["id", "in", [1, 2]]]]));
        assert_eq!(
            call.request.params["kwargs"]["fields"],
            json!(["id", "product_qty"])
        );
    }

    #[tokio::test]
    async fn read_all_defaults_to_empty_domain() {
        let transport = ScriptedTransport::new();
        let mut client = logged_in(&transport).await;
        transport.push_result(json!([{"id": 1}, {"id": 2}]));

        let records = client.read_all("salla.order.status", &["id"], None).await.unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(transport.calls().pop().unwrap().request.params["args"], json!([[]]));
    }

    #[tokio::test]
    async fn non_object_record_is_invalid_response() {
        let transport = ScriptedTransport::new();
        let mut client = logged_in(&transport).await;
        transport.push_result(json!([1, 2]));

        assert_matches!(
            client.search_read("stock.move", &Domain::new(), &["id"]).await,
            Err(RpcError::InvalidResponse(_))
        );
    }

    #[tokio::test]
    async fn read_all_fields_uses_field_definitions() {
        let transport = ScriptedTransport::new();
        let mut client = logged_in(&transport).await;
        transport.push_result(json!({"id": {"type": "integer"}, "name": {"type": "char"}}));
        transport.push_result(json!([{"id": 3, "name": "X"}]));

        let record = client.read_all_fields("stock.picking", 3).await.unwrap();

        assert_eq!(record["name"], "X");
        let calls = transport.calls();
        assert_eq!(calls[0].request.params["method"], "fields_get");
        assert_eq!(calls[0].request.params["args"], json!([]));
        assert_eq!(calls[1].request.params["kwargs"]["fields"], json!(["id", "name"]));
    }

    #[tokio::test]
    async fn search_read_all_fields_uses_field_definitions() {
        let transport = ScriptedTransport::new();
        let mut client = logged_in(&transport).await;
        transport.push_result(json!({"state": {"type": "selection"}}));
        transport.push_result(json!([]));

        client
            .search_read_all_fields("stock.move", &Domain::new())
            .await
            .unwrap();

        let calls = transport.calls();
        assert_eq!(calls[1].request.params["kwargs"]["fields"], json!(["state"]));
    }

    // -- writes --

    #[tokio::test]
    async fn write_is_true_only_for_exact_true() {
        let transport = ScriptedTransport::new();
        let mut client = logged_in(&transport).await;
        let changes = values(json!({"x_studio_delivered": true}));

        transport.push_result(json!(true));
        assert!(client.write("stock.picking", 1, &changes).await.unwrap());

        transport.push_result(json!(1));
        assert!(!client.write("stock.picking", 1, &changes).await.unwrap());

        transport.push_result(json!("true"));
        assert!(!client.write("stock.picking", 1, &changes).await.unwrap());

        transport.push_result(json!(false));
        assert!(!client.write("stock.picking", 1, &changes).await.unwrap());
    }

    #[tokio::test]
    async fn write_many_sends_all_ids_in_one_call() {
        let transport = ScriptedTransport::new();
        let mut client = logged_in(&transport).await;
        transport.push_result(json!(true));

        client
            .write_many("stock.move", &[1, 2], &values(json!({"quantity": 5})))
            .await
            .unwrap();

        let call = transport.calls().pop().unwrap();
        assert_eq!(call.request.params["args"], json!([[1, 2], {"quantity": 5}]));
        assert_eq!(call.request.params["kwargs"], json!({}));
    }

    // -- session expiry --

    #[tokio::test]
    async fn expired_session_reauthenticates_once_and_retries() {
        let transport = ScriptedTransport::new();
        let mut client = logged_in(&transport).await;
        transport.push_error("Session expired");
        transport.push_login(7);
        transport.push_result(json!(true));

        let written = client
            .write("stock.picking", 1, &values(json!({"state": "done"})))
            .await
            .unwrap();

        assert!(written);
        assert_eq!(transport.logins(), 2);
        assert_eq!(transport.calls().len(), 2);
        assert_eq!(client.session().uid(), Some(7));
    }

    #[tokio::test]
    async fn expiry_reported_in_debug_payload_also_retries() {
        let transport = ScriptedTransport::new();
        let mut client = logged_in(&transport).await;
        transport.push_remote(RemoteError {
            code: Some(100),
            message: "Odoo Session Invalid".into(),
            data: json!({"name": "odoo.http.SessionExpiredException", "message": "Session expired"}),
        });
        transport.push_login(2);
        transport.push_result(json!([]));

        let records = client.read_all("stock.move", &["id"], None).await.unwrap();
        assert!(records.is_empty());
        assert_eq!(transport.logins(), 2);
    }

    #[tokio::test]
    async fn retry_failing_again_reports_reauth_context() {
        let transport = ScriptedTransport::new();
        let mut client = logged_in(&transport).await;
        transport.push_error("Session expired");
        transport.push_login(2);
        transport.push_error("Session expired");

        let result = client.call_method("stock.picking", "update_salla", vec![json!(1)], Kwargs::new()).await;

        assert_matches!(result, Err(RpcError::RemoteAfterReauth(_)));
        assert_eq!(transport.logins(), 2);
    }

    #[tokio::test]
    async fn failed_reauthentication_surfaces_reauth_failure() {
        let transport = ScriptedTransport::new();
        let mut client = logged_in(&transport).await;
        transport.push_error("Session expired");
        transport.push_result(json!({}));

        let result = client.call_method("stock.picking", "update_salla", vec![json!(1)], Kwargs::new()).await;

        let err = result.unwrap_err();
        assert!(err.is_remote());
        assert_matches!(
            &err,
            RpcError::ReauthFailed { message, source }
                if message == "Session expired"
                    && matches!(**source, RpcError::Authentication(_))
        );
        assert!(!client.session().is_authenticated());
    }

    #[tokio::test]
    async fn retry_budget_is_configurable() {
        let transport = ScriptedTransport::new();
        let mut config = test_config();
        config.max_session_retries = 0;
        let mut client = OdooClient::with_transport(&config, transport.clone());
        transport.push_login(2);
        client.authenticate().await.unwrap();
        transport.push_error("Session expired");

        let result = client.call_method("stock.picking", "update_salla", vec![json!(1)], Kwargs::new()).await;

        assert_matches!(result, Err(RpcError::Remote(e)) if e.is_session_expired());
        assert_eq!(transport.logins(), 1);
    }

    #[tokio::test]
    async fn other_remote_errors_are_not_retried() {
        let transport = ScriptedTransport::new();
        let mut client = logged_in(&transport).await;
        transport.push_error("ValidationError: quantity must be positive");

        let result = client
            .write("stock.move", 1, &values(json!({"quantity": -1})))
            .await;

        assert_matches!(result, Err(RpcError::Remote(e)) if e.message.contains("ValidationError"));
        assert_eq!(transport.logins(), 1);
        assert_eq!(transport.calls().len(), 1);
    }

    #[tokio::test]
    async fn transport_failures_propagate() {
        let transport = ScriptedTransport::new();
        let mut client = logged_in(&transport).await;
        transport.push_failure(RpcError::Protocol {
            status: 502,
            body: "Bad Gateway".into(),
        });

        assert_matches!(
            client.read("stock.picking", 1, &["id"]).await,
            Err(RpcError::Protocol { status: 502, .. })
        );
    }
}
