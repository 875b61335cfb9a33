// ==========================================
// 用户信息导入 - 导入配置读取 Trait
// ==========================================
// 职责: 定义导入模块所需的配置读取接口
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::config::config_manager::config_keys;
use crate::config::import_settings::ImportSettings;
use crate::repository::{RepositoryError, RepositoryResult};

// ==========================================
// ImportConfigReader Trait
// ==========================================
// 用途: 读取导入参数覆写项
// 实现者: ConfigManager（从 config_kv 表读取）
pub trait ImportConfigReader: Send + Sync {
    /// 读取 global scope 的原始配置值
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    fn get_config_value(&self, key: &str) -> RepositoryResult<Option<String>>;

    /// 组装导入参数（缺省项使用默认值）
    ///
    /// # 覆写项
    /// - import.locale: 决定默认表头语言
    /// - import.sheet_name
    /// - import.header_labels: JSON 字符串数组，项数不少于列计划覆盖的列数
    /// - import.first_data_row: 0 基行号
    fn load_import_settings(&self) -> RepositoryResult<ImportSettings> {
        let mut settings = match self.get_config_value(config_keys::IMPORT_LOCALE)? {
            Some(locale) => ImportSettings::for_locale(locale.trim()),
            None => ImportSettings::default(),
        };

        if let Some(sheet_name) = self.get_config_value(config_keys::IMPORT_SHEET_NAME)? {
            settings.sheet_name = sheet_name.trim().to_string();
        }

        if let Some(raw) = self.get_config_value(config_keys::IMPORT_HEADER_LABELS)? {
            let labels = serde_json::from_str::<Vec<String>>(&raw).map_err(|e| {
                RepositoryError::FieldValueError {
                    field: config_keys::IMPORT_HEADER_LABELS.to_string(),
                    message: e.to_string(),
                }
            })?;

            // 标签过少会让表头校验跳过未覆盖的列
            let required = settings.columns.width();
            if labels.len() < required {
                return Err(RepositoryError::FieldValueError {
                    field: config_keys::IMPORT_HEADER_LABELS.to_string(),
                    message: format!("需要至少 {} 个表头标签，实际 {} 个", required, labels.len()),
                });
            }
            settings.header_labels = labels;
        }

        if let Some(raw) = self.get_config_value(config_keys::IMPORT_FIRST_DATA_ROW)? {
            settings.first_data_row =
                raw.trim()
                    .parse::<u32>()
                    .map_err(|e| RepositoryError::FieldValueError {
                        field: config_keys::IMPORT_FIRST_DATA_ROW.to_string(),
                        message: e.to_string(),
                    })?;
        }

        Ok(settings)
    }
}
