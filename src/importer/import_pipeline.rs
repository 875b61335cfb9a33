// ==========================================
// 用户信息导入 - 导入管道
// ==========================================
// 流程: 格式识别 → 读取 sheet → 表头校验 → 行映射 → 落库 → 结果消息
// 状态: Start → FormatDetected → SheetSelected → HeaderValidated
//       → RowsMapped → Persisted → Done，任一步可转入 Failed
// 策略: 不重试，任何失败即终止本次导入
// ==========================================

use crate::config::import_settings::ImportSettings;
use crate::domain::sheet::Sheet;
use crate::domain::user_info::ImportOutcome;
use crate::i18n;
use crate::importer::error::{ImportError, ImportErrorKind, ImportResult};
use crate::importer::header_validator::HeaderValidator;
use crate::importer::import_trait::SheetLoader;
use crate::importer::row_mapper::RowMapper;
use crate::importer::workbook_loader::{ExcelSheetLoader, WorkbookFormat};
use crate::repository::UserInfoRepository;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

// ==========================================
// ImportStage - 导入状态
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportStage {
    Start,
    FormatDetected,
    SheetSelected,
    HeaderValidated,
    RowsMapped,
    Persisted,
    Done,
    Failed {
        kind: ImportErrorKind,
        message: String,
    },
}

impl ImportStage {
    /// 正常流程中的下一个状态；终态返回 None
    pub fn next(&self) -> Option<ImportStage> {
        let next = match self {
            ImportStage::Start => ImportStage::FormatDetected,
            ImportStage::FormatDetected => ImportStage::SheetSelected,
            ImportStage::SheetSelected => ImportStage::HeaderValidated,
            ImportStage::HeaderValidated => ImportStage::RowsMapped,
            ImportStage::RowsMapped => ImportStage::Persisted,
            ImportStage::Persisted => ImportStage::Done,
            ImportStage::Done | ImportStage::Failed { .. } => return None,
        };
        Some(next)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ImportStage::Done | ImportStage::Failed { .. })
    }
}

/// 单次导入的状态记录
#[derive(Debug, Clone)]
pub struct StageTracker {
    current: ImportStage,
}

impl Default for StageTracker {
    fn default() -> Self {
        Self {
            current: ImportStage::Start,
        }
    }
}

impl StageTracker {
    pub fn current(&self) -> &ImportStage {
        &self.current
    }

    /// 前进到下一个状态（终态不再变化）
    pub fn advance(&mut self) {
        if let Some(next) = self.current.next() {
            debug!(from = ?self.current, to = ?next, "导入状态前进");
            self.current = next;
        }
    }

    /// 转入 Failed（终态不再变化），返回失败前到达的状态
    pub fn fail(&mut self, kind: ImportErrorKind, message: impl Into<String>) -> ImportStage {
        if self.current.is_terminal() {
            return self.current.clone();
        }
        std::mem::replace(
            &mut self.current,
            ImportStage::Failed {
                kind,
                message: message.into(),
            },
        )
    }
}

// ==========================================
// ImportPipeline - 导入管道
// ==========================================
pub struct ImportPipeline<R>
where
    R: UserInfoRepository,
{
    // 持久化协作者（构造时注入）
    repo: R,

    // 导入参数
    settings: ImportSettings,

    // 导入组件
    loader: Box<dyn SheetLoader>,
    header_validator: HeaderValidator,
    row_mapper: RowMapper,
}

impl<R> ImportPipeline<R>
where
    R: UserInfoRepository,
{
    /// 创建新的 ImportPipeline 实例（使用 calamine 读取工作簿）
    ///
    /// # 参数
    /// - repo: 用户信息仓储
    /// - settings: 导入参数
    pub fn new(repo: R, settings: ImportSettings) -> Self {
        Self {
            repo,
            settings,
            loader: Box::new(ExcelSheetLoader),
            header_validator: HeaderValidator,
            row_mapper: RowMapper::new(),
        }
    }

    /// 替换工作表加载器
    pub fn with_loader(mut self, loader: Box<dyn SheetLoader>) -> Self {
        self.loader = loader;
        self
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    pub fn settings(&self) -> &ImportSettings {
        &self.settings
    }

    /// 从文件导入用户信息
    ///
    /// # 参数
    /// - path: 文件路径（上传临时文件的路径可能不带原始扩展名）
    /// - file_name: 原始文件名；None 时取 path 的文件名
    ///
    /// # 返回
    /// - Ok(ImportOutcome): 已落库的记录 + 结果消息
    /// - Err(ImportError): 第一个遇到的错误
    #[instrument(skip(self, path), fields(batch_id))]
    pub fn import_file(
        &self,
        path: &Path,
        file_name: Option<&str>,
    ) -> ImportResult<ImportOutcome> {
        let start_time = Instant::now();
        let batch_id = Uuid::new_v4().to_string();
        tracing::Span::current().record("batch_id", batch_id.as_str());

        let file_name = file_name
            .map(str::to_string)
            .unwrap_or_else(|| {
                path.file_name()
                    .map(|name| name.to_string_lossy().to_string())
                    .unwrap_or_default()
            });
        info!(file = %file_name, path = %path.display(), "开始导入用户信息");

        let mut tracker = StageTracker::default();
        let result = self
            .load(path, &file_name, &mut tracker)
            .and_then(|sheet| self.process_sheet(&sheet, &batch_id, &mut tracker));

        match result {
            Ok(mut outcome) => {
                outcome.file_name = Some(file_name);
                outcome.elapsed_ms = start_time.elapsed().as_millis() as u64;
                info!(
                    batch_id = %outcome.batch_id,
                    inserted = outcome.inserted,
                    elapsed_ms = outcome.elapsed_ms,
                    "用户信息导入完成"
                );
                Ok(outcome)
            }
            Err(e) => {
                log_failure(&mut tracker, &e);
                Err(e)
            }
        }
    }

    /// 导入已在内存中的工作表（跳过格式识别与文件读取）
    #[instrument(skip(self, sheet), fields(batch_id, sheet = sheet.name()))]
    pub fn import_sheet(&self, sheet: &Sheet) -> ImportResult<ImportOutcome> {
        let start_time = Instant::now();
        let batch_id = Uuid::new_v4().to_string();
        tracing::Span::current().record("batch_id", batch_id.as_str());

        let mut tracker = StageTracker::default();
        tracker.advance(); // FormatDetected
        tracker.advance(); // SheetSelected

        let mut outcome = self
            .process_sheet(sheet, &batch_id, &mut tracker)
            .inspect_err(|e| log_failure(&mut tracker, e))?;
        outcome.elapsed_ms = start_time.elapsed().as_millis() as u64;
        Ok(outcome)
    }

    // === 步骤 1-2: 格式识别 + 读取 sheet（文件在此关闭）===
    fn load(
        &self,
        path: &Path,
        file_name: &str,
        tracker: &mut StageTracker,
    ) -> ImportResult<Sheet> {
        let format = WorkbookFormat::detect(file_name)?;
        debug!(%format, "步骤 1: 格式识别完成");
        tracker.advance();

        let sheet = self
            .loader
            .load_sheet(path, format, &self.settings.sheet_name)?;
        debug!(sheet = sheet.name(), "步骤 2: 工作表读取完成");
        tracker.advance();

        Ok(sheet)
    }

    // === 步骤 3-5: 表头校验 → 行映射 → 落库 ===
    fn process_sheet(
        &self,
        sheet: &Sheet,
        batch_id: &str,
        tracker: &mut StageTracker,
    ) -> ImportResult<ImportOutcome> {
        self.header_validator.validate_header(
            sheet,
            self.settings.header_row,
            &self.settings.header_labels,
        )?;
        debug!("步骤 3: 表头校验通过");
        tracker.advance();

        let records = self.row_mapper.map_rows(
            sheet,
            self.settings.first_data_row,
            &self.settings.columns,
        )?;
        info!(count = records.len(), "步骤 4: 数据行映射完成");
        tracker.advance();

        let inserted = if records.is_empty() {
            0
        } else {
            self.repo.insert_batch(batch_id, &records)?
        };
        info!(inserted = inserted, "步骤 5: 落库完成");
        tracker.advance();

        let message = if inserted == 0 {
            i18n::t(&self.settings.locale, "import.no_rows")
        } else {
            i18n::t_with_args(
                &self.settings.locale,
                "import.success",
                &[("count", &inserted.to_string())],
            )
        };
        tracker.advance();

        Ok(ImportOutcome {
            batch_id: batch_id.to_string(),
            file_name: None,
            records,
            inserted,
            message,
            elapsed_ms: 0,
        })
    }
}

fn log_failure(tracker: &mut StageTracker, err: &ImportError) {
    let reached = tracker.fail(err.kind(), err.to_string());
    error!(kind = ?err.kind(), error = %err, reached = ?reached, "用户信息导入失败");
}
