// ==========================================
// 用户信息导入 - 应用状态
// ==========================================
// 职责: 管理共享连接、配置管理器与用户信息仓储
// ==========================================

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::config::config_manager::config_keys;
use crate::config::{ConfigManager, ImportConfigReader, ImportSettings};
use crate::db::{init_schema, open_sqlite_connection};
use crate::importer::ImportPipeline;
use crate::repository::{RepositoryError, RepositoryResult, UserInfoRepositoryImpl};

/// 数据库路径环境变量
pub const DB_PATH_ENV: &str = "USER_INFO_IMPORT_DB_PATH";

/// 应用状态
///
/// 配置管理器与仓储共享同一个 SQLite 连接
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 配置管理器（config_kv 覆写项）
    pub config_manager: Arc<ConfigManager>,

    /// 用户信息仓储
    pub user_info_repo: Arc<UserInfoRepositoryImpl>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: String) -> RepositoryResult<Self> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        // 创建数据库连接（共享连接）
        let conn = open_sqlite_connection(&db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        init_schema(&conn)?;
        let conn = Arc::new(Mutex::new(conn));

        let config_manager = Arc::new(ConfigManager::from_connection(conn.clone())?);
        let user_info_repo = Arc::new(UserInfoRepositoryImpl::from_connection(conn)?);

        Ok(Self {
            db_path,
            config_manager,
            user_info_repo,
        })
    }

    /// 组装导入参数
    ///
    /// # 参数
    /// - locale: 命令行指定的语言；未显式配置表头时同时切换默认表头
    pub fn import_settings(&self, locale: Option<&str>) -> RepositoryResult<ImportSettings> {
        let mut settings = self.config_manager.load_import_settings()?;

        if let Some(locale) = locale {
            let labels_configured = self
                .config_manager
                .get_config_value(config_keys::IMPORT_HEADER_LABELS)?
                .is_some();
            if !labels_configured {
                settings.header_labels = ImportSettings::for_locale(locale).header_labels;
            }
            settings.locale = locale.to_string();
        }

        Ok(settings)
    }

    /// 创建导入管道（共享仓储）
    pub fn import_pipeline(
        &self,
        settings: ImportSettings,
    ) -> ImportPipeline<Arc<UserInfoRepositoryImpl>> {
        ImportPipeline::new(self.user_info_repo.clone(), settings)
    }
}

/// 默认数据库路径
///
/// 优先级: 环境变量 → 用户数据目录 → 当前目录
pub fn get_default_db_path() -> String {
    // 允许通过环境变量显式指定 DB 路径（便于调试/测试/CI）
    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./user_info_import.db");

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("user-info-import");
        // 目录创建失败时退回当前目录
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("user_info_import.db");
        }
    }

    path.to_string_lossy().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::UserInfoRepository;
    use tempfile::NamedTempFile;

    fn temp_state() -> (NamedTempFile, AppState) {
        let temp_file = NamedTempFile::new().unwrap();
        let db_path = temp_file.path().to_str().unwrap().to_string();
        let state = AppState::new(db_path).unwrap();
        (temp_file, state)
    }

    #[test]
    fn test_get_default_db_path() {
        let path = get_default_db_path();
        assert!(!path.is_empty());
        assert!(path.ends_with(".db"));
    }

    #[test]
    fn test_state_shares_one_database() {
        let (_temp_file, state) = temp_state();
        state
            .config_manager
            .set_global_config_value(config_keys::IMPORT_SHEET_NAME, "Users")
            .unwrap();

        let settings = state.import_settings(None).unwrap();
        assert_eq!(settings.sheet_name, "Users");
        assert_eq!(state.user_info_repo.count().unwrap(), 0);
    }

    #[test]
    fn test_locale_flag_switches_default_labels() {
        let (_temp_file, state) = temp_state();

        let settings = state.import_settings(Some("zh-CN")).unwrap();
        assert_eq!(settings.header_labels, vec!["姓名", "年龄", "地址", "电话"]);
        assert_eq!(settings.locale, "zh-CN");
    }

    #[test]
    fn test_locale_flag_keeps_configured_labels() {
        let (_temp_file, state) = temp_state();
        state
            .config_manager
            .set_global_config_value(config_keys::IMPORT_HEADER_LABELS, r#"["A","B","C","D"]"#)
            .unwrap();

        let settings = state.import_settings(Some("zh-CN")).unwrap();
        assert_eq!(settings.header_labels, vec!["A", "B", "C", "D"]);
        assert_eq!(settings.locale, "zh-CN");
    }
}
