use std::time::Instant;

use reqwest::Request;
use tracing::debug;

use crate::config::RequestSpec;
use crate::http::builder::build_request;
use crate::http::response::ExecutionResult;
use crate::http::types::{BuildError, NetworkError};
use crate::persist::CookieRecord;

/// 发送请求并完整读取响应
///
/// 使用 reqwest 默认配置：跟随重定向，不设置超时。
/// 需要超时的调用方自行包一层 `tokio::time::timeout`。
#[derive(Clone)]
pub struct Dispatcher {
    inner: reqwest::Client,
}

impl Dispatcher {
    pub fn new() -> Result<Self, NetworkError> {
        let inner = reqwest::Client::builder()
            .build()
            .map_err(NetworkError::Client)?;
        Ok(Self { inner })
    }

    /// 用本 dispatcher 的 client 构建请求
    pub async fn build(
        &self,
        spec: &RequestSpec,
        jar: &[CookieRecord],
    ) -> Result<Request, BuildError> {
        build_request(&self.inner, spec, jar).await
    }

    /// 状态码 >= 400 仍然返回 Ok，只有传输失败才是 NetworkError
    pub async fn dispatch(&self, request: Request) -> Result<ExecutionResult, NetworkError> {
        let url = request.url().to_string();
        let method = request.method().clone();

        let start = Instant::now();
        let response = self
            .inner
            .execute(request)
            .await
            .map_err(|source| NetworkError::Transport {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .bytes()
            .await
            .map_err(|source| NetworkError::Body {
                url: url.clone(),
                source,
            })?;
        let duration = start.elapsed();

        debug!(%method, %url, status = status.as_u16(), bytes = body.len(), "Response received");

        Ok(ExecutionResult::from_parts(
            status,
            &headers,
            body.to_vec(),
            duration,
        ))
    }
}
