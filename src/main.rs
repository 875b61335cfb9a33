// ==========================================
// 用户信息导入 - 命令行入口
// ==========================================
// 子命令:
// - import: 导入 Excel 用户信息到 SQLite
// - inspect: 查看工作表的合并单元格
// ==========================================

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use user_info_import::app::{get_default_db_path, AppState};
use user_info_import::config::import_settings::DEFAULT_SHEET_NAME;
use user_info_import::domain::parse_cell_ref;
use user_info_import::importer::{
    ExcelSheetLoader, MergeState, MergedRegionIndex, SheetLoader, WorkbookFormat,
};
use user_info_import::logging;

#[derive(Parser)]
#[command(name = "user-info-import")]
#[command(author, version, about = "Import user info spreadsheets into SQLite")]
struct Cli {
    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate and import a user info workbook
    Import {
        /// Workbook file (xlsx, xls)
        file: PathBuf,

        /// Original file name, used for format detection (default: FILE's name)
        #[arg(long)]
        file_name: Option<String>,

        /// SQLite database path
        #[arg(long)]
        db: Option<String>,

        /// Header language (en, zh-CN)
        #[arg(long)]
        locale: Option<String>,

        /// Print the full outcome as JSON
        #[arg(long)]
        json: bool,
    },

    /// List merged regions of a sheet
    Inspect {
        /// Workbook file (xlsx, xls)
        file: PathBuf,

        /// Original file name, used for format detection (default: FILE's name)
        #[arg(long)]
        file_name: Option<String>,

        /// Sheet name
        #[arg(long, default_value = DEFAULT_SHEET_NAME)]
        sheet: String,

        /// Query a single cell instead, e.g. B3
        #[arg(long)]
        cell: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.log_json {
        logging::init_json();
    } else {
        logging::init();
    }

    match cli.command {
        Commands::Import {
            file,
            file_name,
            db,
            locale,
            json,
        } => import(&file, file_name.as_deref(), db, locale.as_deref(), json),
        Commands::Inspect {
            file,
            file_name,
            sheet,
            cell,
        } => inspect(&file, file_name.as_deref(), &sheet, cell.as_deref()),
    }
}

fn import(
    file: &Path,
    file_name: Option<&str>,
    db: Option<String>,
    locale: Option<&str>,
    json: bool,
) -> Result<()> {
    let db_path = db.unwrap_or_else(get_default_db_path);
    let state = AppState::new(db_path.clone())
        .with_context(|| format!("Failed to open database '{}'", db_path))?;

    let settings = state
        .import_settings(locale)
        .context("Failed to load import settings")?;
    let pipeline = state.import_pipeline(settings);

    let outcome = pipeline
        .import_file(file, file_name)
        .with_context(|| format!("Failed to import '{}'", file.display()))?;

    if json {
        let text = serde_json::to_string_pretty(&outcome).context("Failed to serialize outcome")?;
        println!("{}", text);
    } else {
        println!("{}", outcome.message);
    }

    Ok(())
}

fn inspect(file: &Path, file_name: Option<&str>, sheet_name: &str, cell: Option<&str>) -> Result<()> {
    let name = match file_name {
        Some(name) => name.to_string(),
        None => file
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default(),
    };
    let format = WorkbookFormat::detect(&name)?;
    let sheet = ExcelSheetLoader
        .load_sheet(file, format, sheet_name)
        .with_context(|| format!("Failed to read '{}'", file.display()))?;
    let index = MergedRegionIndex::build(&sheet);

    if let Some(reference) = cell {
        let Some((row, col)) = parse_cell_ref(reference) else {
            bail!("Invalid cell reference '{}'", reference);
        };
        match index.query(row, col) {
            MergeState::NotMerged => println!("{}: not merged", reference),
            MergeState::Merged {
                row_span,
                col_span,
                top_left,
            } => println!(
                "{}: merged {}x{}{}",
                reference,
                row_span,
                col_span,
                if top_left { " (top-left)" } else { "" }
            ),
        }
        return Ok(());
    }

    if index.is_empty() {
        println!("{}: no merged regions", sheet.name());
        return Ok(());
    }

    println!("{}: {} merged region(s)", sheet.name(), index.len());
    for region in index.regions() {
        println!(
            "  {:<12} rows={} cols={}",
            region.to_a1(),
            region.row_span(),
            region.col_span()
        );
    }

    Ok(())
}
