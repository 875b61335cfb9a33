// ==========================================
// 国际化 (i18n) 模块
// ==========================================
// 使用 rust-i18n 库
// 支持英文（默认）和中文
// ==========================================
// 注意: rust_i18n::i18n! 宏已在 lib.rs 中初始化
// 导入流程按 ImportSettings.locale 显式取文案，不依赖全局 locale
// ==========================================

/// 翻译消息（无参数）
///
/// # 示例
/// ```no_run
/// use user_info_import::i18n::t;
/// let label = t("zh-CN", "header.name");
/// ```
pub fn t(locale: &str, key: &str) -> String {
    rust_i18n::t!(key, locale = locale).to_string()
}

/// 翻译消息（带参数）
///
/// # 示例
/// ```no_run
/// use user_info_import::i18n::t_with_args;
/// let msg = t_with_args("en", "import.success", &[("count", "2")]);
/// ```
pub fn t_with_args(locale: &str, key: &str, args: &[(&str, &str)]) -> String {
    let mut result = t(locale, key);
    for (k, v) in args {
        let placeholder = format!("%{{{}}}", k);
        result = result.replace(&placeholder, v);
    }
    result
}
