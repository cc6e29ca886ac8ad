use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;

use super::ClientConfig;
use crate::{
    models::{CreateTodoRequest, MessageBody, Todo, UpdateTodoRequest},
    response::ErrorBody,
};

pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("server responded {status}: {message}")]
    Status { status: u16, message: String },
    #[error("unexpected response body: {0}")]
    Decode(String),
}

/// The four todo operations the view depends on.
#[async_trait]
pub trait TodoApi: Send + Sync + 'static {
    async fn list(&self) -> ClientResult<Vec<Todo>>;
    async fn create(&self, title: &str) -> ClientResult<Todo>;
    async fn update(&self, id: i32, changes: &UpdateTodoRequest) -> ClientResult<Todo>;
    async fn delete(&self, id: i32) -> ClientResult<()>;
}

#[derive(Clone)]
pub struct HttpTodoApi {
    http: Client,
    base_url: String,
}

impl HttpTodoApi {
    pub fn new(cfg: &ClientConfig) -> ClientResult<Self> {
        let http = Client::builder().timeout(cfg.request_timeout).build()?;
        Ok(Self {
            http,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn todos_url(&self) -> String {
        format!("{}/api/todos", self.base_url)
    }

    fn todo_url(&self, id: i32) -> String {
        format!("{}/api/todos/{id}", self.base_url)
    }
}

#[async_trait]
impl TodoApi for HttpTodoApi {
    async fn list(&self) -> ClientResult<Vec<Todo>> {
        let resp = self.http.get(self.todos_url()).send().await?;
        read_json(resp).await
    }

    async fn create(&self, title: &str) -> ClientResult<Todo> {
        let resp = self
            .http
            .post(self.todos_url())
            .json(&CreateTodoRequest {
                title: title.to_string(),
            })
            .send()
            .await?;
        read_json(resp).await
    }

    async fn update(&self, id: i32, changes: &UpdateTodoRequest) -> ClientResult<Todo> {
        let resp = self.http.put(self.todo_url(id)).json(changes).send().await?;
        read_json(resp).await
    }

    async fn delete(&self, id: i32) -> ClientResult<()> {
        let resp = self.http.delete(self.todo_url(id)).send().await?;
        let _: MessageBody = read_json(resp).await?;
        Ok(())
    }
}

async fn read_json<T: DeserializeOwned>(resp: Response) -> ClientResult<T> {
    let status = resp.status();
    let text = resp.text().await?;

    if !status.is_success() {
        let message = serde_json::from_str::<ErrorBody>(&text)
            .map(|body| body.error)
            .unwrap_or(text);
        return Err(ClientError::Status {
            status: status.as_u16(),
            message,
        });
    }

    serde_json::from_str(&text).map_err(|err| ClientError::Decode(err.to_string()))
}
