use reqwest::header::{CONTENT_TYPE, COOKIE, HeaderName, HeaderValue};
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client, Method, Request, RequestBuilder};
use serde_json::Value;
use url::Url;

use crate::config::RequestSpec;
use crate::http::types::{BuildError, CredentialKind};
use crate::persist::CookieRecord;

/// 将请求定义转换为可发送的 reqwest::Request
///
/// 顺序固定：
/// 1. 请求体（有附件时为 multipart，否则为 JSON，body 为空也带 JSON Content-Type）
/// 2. 凭据（basic / bearer）
/// 3. 声明的 headers，逐个覆盖，可以覆盖第 2 步写入的 Authorization
/// 4. cookie jar 中的 cookie
pub async fn build_request(
    client: &Client,
    spec: &RequestSpec,
    jar: &[CookieRecord],
) -> Result<Request, BuildError> {
    let method = spec.method();
    if method.is_empty() {
        return Err(BuildError::MissingMethod);
    }
    let raw_url = spec.url.trim();
    if raw_url.is_empty() {
        return Err(BuildError::MissingUrl);
    }

    let method = Method::from_bytes(method.to_ascii_uppercase().as_bytes())
        .map_err(|_| BuildError::InvalidMethod(method.to_string()))?;
    let url = Url::parse(raw_url).map_err(|source| BuildError::InvalidUrl {
        url: raw_url.to_string(),
        source,
    })?;

    let mut builder = client.request(method, url);

    // 附件全部读取成功后才会继续，任何一个失败都不会发出请求
    if spec.attachments.is_empty() {
        builder = builder.header(CONTENT_TYPE, "application/json");
        if let Some(body) = spec.body.as_ref().filter(|b| !b.is_empty()) {
            builder = builder.json(body);
        }
    } else {
        builder = builder.multipart(multipart_form(spec).await?);
    }

    builder = apply_credentials(builder, spec)?;

    let mut request = builder.build().map_err(BuildError::Request)?;

    apply_headers(&mut request, spec)?;

    if spec.includes_cookies() {
        attach_cookies(&mut request, jar)?;
    }

    Ok(request)
}

async fn multipart_form(spec: &RequestSpec) -> Result<Form, BuildError> {
    let mut form = Form::new();

    if let Some(body) = &spec.body {
        for (key, value) in body {
            form = form.text(key.clone(), field_text(value));
        }
    }

    for attachment in &spec.attachments {
        let open_err = |source: std::io::Error| BuildError::FileOpen {
            path: attachment.path.clone(),
            source,
        };
        let file = tokio::fs::File::open(&attachment.path)
            .await
            .map_err(open_err)?;
        let length = file.metadata().await.map_err(open_err)?.len();

        let file_name = attachment
            .path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("file")
            .to_string();

        form = form.part(
            attachment.name.clone(),
            Part::stream_with_length(Body::from(file), length).file_name(file_name),
        );
    }

    Ok(form)
}

/// multipart 文本字段：字符串原样，其余值使用 JSON 文本
fn field_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn apply_credentials(
    builder: RequestBuilder,
    spec: &RequestSpec,
) -> Result<RequestBuilder, BuildError> {
    let creds = &spec.credentials;
    if !spec.include_credentials || creds.is_unset() {
        return Ok(builder);
    }

    Ok(match creds.kind.parse::<CredentialKind>()? {
        CredentialKind::Basic => builder.basic_auth(&creds.username, Some(&creds.password)),
        CredentialKind::Bearer => builder.bearer_auth(&creds.token),
    })
}

fn apply_headers(request: &mut Request, spec: &RequestSpec) -> Result<(), BuildError> {
    for (key, value) in spec.real_headers() {
        let name = HeaderName::from_bytes(key.as_bytes()).map_err(|e| {
            BuildError::InvalidHeader {
                name: key.to_string(),
                message: e.to_string(),
            }
        })?;
        let value = HeaderValue::from_str(value).map_err(|e| BuildError::InvalidHeader {
            name: key.to_string(),
            message: e.to_string(),
        })?;
        request.headers_mut().insert(name, value);
    }
    Ok(())
}

/// 追加到已有的 Cookie header 之后
fn attach_cookies(request: &mut Request, jar: &[CookieRecord]) -> Result<(), BuildError> {
    let pairs: Vec<String> = jar
        .iter()
        .filter(|c| c.is_sendable())
        .map(CookieRecord::pair)
        .collect();
    if pairs.is_empty() {
        return Ok(());
    }

    let mut value = pairs.join("; ");
    if let Some(existing) = request.headers().get(COOKIE).and_then(|v| v.to_str().ok())
        && !existing.is_empty()
    {
        value = format!("{}; {}", existing, value);
    }

    let header = HeaderValue::from_str(&value).map_err(|e| BuildError::InvalidHeader {
        name: COOKIE.as_str().to_string(),
        message: e.to_string(),
    })?;
    request.headers_mut().insert(COOKIE, header);
    Ok(())
}
