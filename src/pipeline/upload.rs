// 该文件是 Naoying （脑影） 项目的一部分。
// src/pipeline/upload.rs - 上传文件校验与临时存储
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

use std::{fs, io::Write, path::Path};

use tempfile::NamedTempFile;
use tracing::{debug, warn};
use unicode_normalization::UnicodeNormalization;

use crate::input::ALLOWED_EXTENSIONS;

/// 临时上传文件名前缀，启动清理只删除带此前缀的文件
const UPLOAD_PREFIX: &str = "naoying-";

const MAX_STEM_LEN: usize = 64;

/// 请求中的上传文件
#[derive(Debug, Clone, Default)]
pub struct UploadedFile {
  pub filename: String,
  pub bytes: Vec<u8>,
}

impl UploadedFile {
  pub fn new(filename: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
    Self {
      filename: filename.into(),
      bytes: bytes.into(),
    }
  }
}

/// 取文件名最后一个点之后的扩展名，在允许列表中时返回其小写规范形式
pub fn allowed_extension(filename: &str) -> Option<&'static str> {
  let (_, ext) = filename.rsplit_once('.')?;
  let ext = ext.to_ascii_lowercase();
  ALLOWED_EXTENSIONS.into_iter().find(|allowed| *allowed == ext)
}

/// 净化文件名，去除路径分隔符与不安全字符
///
/// 先做 NFKD 分解以保留带变音符号字母的 ASCII 基字符，
/// 之后只保留 ASCII 字母数字与 `_.-`，空白折叠为 `_`，并去掉首尾的 `.` 和 `_`。
/// 结果可能为空字符串。
pub fn secure_filename(filename: &str) -> String {
  let replaced: String = filename
    .nfkd()
    .filter(char::is_ascii)
    .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
    .collect();

  let joined = replaced.split_whitespace().collect::<Vec<_>>().join("_");
  let kept: String = joined
    .chars()
    .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
    .collect();

  kept.trim_matches(|c| c == '.' || c == '_').to_string()
}

/// 将上传内容写入上传目录中的唯一临时文件，文件在句柄析构时删除
///
/// 文件名形如 `naoying-<stem>-XXXXXX.<ext>`，随机后缀保证同名并发上传互不覆盖。
pub fn stage_upload(
  dir: &Path,
  safe_name: &str,
  ext: &str,
  bytes: &[u8],
) -> std::io::Result<NamedTempFile> {
  let stem = safe_name
    .rsplit_once('.')
    .map_or(safe_name, |(stem, _)| stem);
  let stem: String = if stem.is_empty() {
    "upload".to_string()
  } else {
    stem.chars().take(MAX_STEM_LEN).collect()
  };

  let mut file = tempfile::Builder::new()
    .prefix(&format!("{}{}-", UPLOAD_PREFIX, stem))
    .suffix(&format!(".{}", ext))
    .tempfile_in(dir)?;
  file.write_all(bytes)?;
  file.flush()?;
  debug!("上传文件已暂存: {} ({} 字节)", file.path().display(), bytes.len());
  Ok(file)
}

/// 创建上传目录并清理上次进程遗留的临时文件，返回删除的文件数
pub fn sweep_stale_uploads(dir: &Path) -> std::io::Result<usize> {
  fs::create_dir_all(dir)?;

  let mut removed = 0;
  for entry in fs::read_dir(dir)? {
    let entry = entry?;
    let is_stale = entry.file_type()?.is_file()
      && entry
        .file_name()
        .to_str()
        .is_some_and(|name| name.starts_with(UPLOAD_PREFIX));
    if !is_stale {
      continue;
    }
    match fs::remove_file(entry.path()) {
      Ok(()) => removed += 1,
      Err(e) => warn!("无法删除遗留上传文件 {}: {}", entry.path().display(), e),
    }
  }
  Ok(removed)
}
