// 该文件是 Naoying （脑影） 项目的一部分。
// src/server.rs - HTTP 接口
//
// 本文件根据 Apache 许可证第 2.0 版（以下简称“许可证”）授权使用；
// 除非遵守该许可证条款，否则您不得使用本文件。
// 您可通过以下网址获取许可证副本：
// http://www.apache.org/licenses/LICENSE-2.0
// 除非适用法律要求或书面同意，根据本许可协议分发的软件均按“原样”提供，
// 不附带任何形式的明示或暗示的保证或条件。
// 有关许可权限与限制的具体条款，请参阅本许可协议。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, Wareless Group

use std::{path::PathBuf, sync::Arc};

use axum::{
  Json, Router,
  extract::{
    DefaultBodyLimit, Multipart, State,
    multipart::{MultipartError, MultipartRejection},
  },
  http::StatusCode,
  response::{IntoResponse, Response},
  routing::{get, post},
};
use serde::Serialize;
use tower_http::{
  services::{ServeDir, ServeFile},
  trace::TraceLayer,
};
use tracing::{error, warn};

use crate::{
  error::PipelineError,
  output::PredictionResult,
  pipeline::{PredictionPipeline, UploadedFile},
};

/// 上传大小上限默认值，16 MiB
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

const UPLOAD_FIELD: &str = "file";

#[derive(Debug, Clone)]
pub struct ServerOptions {
  pub static_dir: PathBuf,
  pub max_upload_bytes: usize,
}

impl Default for ServerOptions {
  fn default() -> Self {
    Self {
      static_dir: PathBuf::from("static"),
      max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
    }
  }
}

#[derive(Clone)]
pub struct AppState {
  pipeline: Arc<PredictionPipeline>,
}

/// 构建完整路由
pub fn router(pipeline: Arc<PredictionPipeline>, options: &ServerOptions) -> Router {
  let state = AppState { pipeline };

  let api = Router::new()
    .route("/api/predict", post(predict))
    .route("/api/health", get(health))
    .layer(DefaultBodyLimit::max(options.max_upload_bytes))
    .with_state(state);

  Router::new()
    .route_service("/", ServeFile::new(options.static_dir.join("index.html")))
    .nest_service("/static", ServeDir::new(&options.static_dir))
    .merge(api)
    .layer(TraceLayer::new_for_http())
}

#[derive(Serialize)]
struct PredictResponse {
  success: bool,
  #[serde(flatten)]
  result: PredictionResult,
}

#[derive(Serialize)]
struct HealthResponse {
  status: &'static str,
  model_loaded: bool,
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
  Json(HealthResponse {
    status: "healthy",
    model_loaded: state.pipeline.model_loaded(),
  })
}

async fn predict(
  State(state): State<AppState>,
  multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<PredictResponse>, ApiError> {
  // 模型未加载时不读取请求体
  if !state.pipeline.model_loaded() {
    return Err(PipelineError::ModelUnavailable.into());
  }

  let upload = match multipart {
    Ok(multipart) => read_upload(multipart).await?,
    // 非 multipart 请求等同于没有文件部分
    Err(_) => None,
  };

  let result = state.pipeline.predict_request(upload).await?;
  Ok(Json(PredictResponse {
    success: true,
    result,
  }))
}

/// 读取带文件名的 `file` 字段；其余字段（包括不带文件名的普通表单字段）被丢弃
async fn read_upload(mut multipart: Multipart) -> Result<Option<UploadedFile>, ApiError> {
  while let Some(field) = multipart.next_field().await? {
    if field.name() != Some(UPLOAD_FIELD) {
      continue;
    }
    let Some(filename) = field.file_name().map(str::to_string) else {
      continue;
    };
    let bytes = field.bytes().await?;
    return Ok(Some(UploadedFile::new(filename, bytes.to_vec())));
  }
  Ok(None)
}

/// 对外错误响应，正文为 `{"error": <message>}`
#[derive(Debug, Clone)]
pub struct ApiError {
  status: StatusCode,
  message: String,
}

impl From<PipelineError> for ApiError {
  fn from(err: PipelineError) -> Self {
    if err.is_client_fault() {
      warn!("请求被拒绝: {}", err);
    } else {
      error!("推理请求失败: {}", err);
    }
    Self {
      status: err.status_code(),
      message: err.to_string(),
    }
  }
}

impl From<MultipartError> for ApiError {
  fn from(err: MultipartError) -> Self {
    let status = err.status();
    warn!("上传内容读取失败 ({}): {}", status, err.body_text());
    Self {
      status,
      message: err.body_text(),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    #[derive(Serialize)]
    struct ErrorBody<'a> {
      error: &'a str,
    }

    (
      self.status,
      Json(ErrorBody {
        error: &self.message,
      }),
    )
      .into_response()
  }
}
