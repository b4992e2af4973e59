//! sibsclean CLI
//!
//! SIBSレポートを一括で整形するコマンドラインツール。
//!
//! ```text
//! sibsclean [options] <report.xls>...
//! ```
//!
//! ログは`RUST_LOG`で制御します（例: `RUST_LOG=debug`）。

use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use log::{info, warn};
use sibsclean::{
    BillingKeywords, CleanerBuilder, Delivery, InputFile, SibsError, SibsLayout, SkippedFile,
};

/// コマンドライン引数
#[derive(Debug, Default)]
struct Options {
    inputs: Vec<PathBuf>,
    out_dir: Option<PathBuf>,
    layout: Option<PathBuf>,
    keywords: Option<Vec<String>>,
    billing: bool,
    no_format: bool,
}

fn print_usage(program: &str) {
    eprintln!("Usage: {} [options] <report.xls|report.xlsx>...", program);
    eprintln!("\nOptions:");
    eprintln!("  --billing             Add a 'Faturamento' sheet with billing items only");
    eprintln!("  --no-format           Write raw values without number formats or totals");
    eprintln!("  --out-dir <dir>       Directory for the output file (default: current)");
    eprintln!("  --layout <file.json>  Load the SIBS column layout from JSON");
    eprintln!("  --keywords <a,b,...>  Billing keywords (default: mil,sod)");
    eprintln!("\nExamples:");
    eprintln!("  {} relatorio.xls", program);
    eprintln!("  {} --billing jan.xls fev.xlsx --out-dir saida", program);
}

fn parse_args(args: &[String]) -> Result<Options, String> {
    let mut options = Options::default();
    let mut i = 1;

    while i < args.len() {
        match args[i].as_str() {
            "--billing" => options.billing = true,
            "--no-format" => options.no_format = true,
            "--out-dir" | "--layout" | "--keywords" => {
                let flag = args[i].as_str();
                let value = args
                    .get(i + 1)
                    .ok_or_else(|| format!("{} requires a value", flag))?;
                match flag {
                    "--out-dir" => options.out_dir = Some(PathBuf::from(value)),
                    "--layout" => options.layout = Some(PathBuf::from(value)),
                    _ => {
                        options.keywords = Some(
                            value
                                .split(',')
                                .map(|k| k.trim().to_string())
                                .filter(|k| !k.is_empty())
                                .collect(),
                        )
                    }
                }
                i += 1;
            }
            other if other.starts_with("--") => return Err(format!("Unknown option: {}", other)),
            path => options.inputs.push(PathBuf::from(path)),
        }
        i += 1;
    }

    if options.inputs.is_empty() {
        return Err("No input files given".to_string());
    }
    Ok(options)
}

fn run(options: &Options) -> Result<usize, SibsError> {
    let mut builder = CleanerBuilder::new()
        .apply_billing_split(options.billing)
        .apply_formatting(!options.no_format);

    if let Some(path) = &options.layout {
        builder = builder.with_layout(SibsLayout::from_json(&fs::read_to_string(path)?)?);
    }
    if let Some(keywords) = &options.keywords {
        builder = builder.with_billing_keywords(BillingKeywords::new(keywords));
    }
    let cleaner = builder.build()?;

    let (inputs, unreadable) = read_inputs(&options.inputs);

    let mut report = cleaner.clean_batch(&inputs);
    report.skipped.extend(unreadable);
    for skipped in &report.skipped {
        print_skipped(skipped);
    }

    let mut processed = report.outputs.len();
    let total_records = report.total_records();
    let Some(delivery) = report.into_delivery()? else {
        eprintln!("Nenhum arquivo processado com sucesso.");
        return Ok(0);
    };

    if let Delivery::Archive { rejected, .. } = &delivery {
        for skipped in rejected {
            print_skipped(skipped);
        }
        processed -= rejected.len();
    }

    let out_dir = options.out_dir.clone().unwrap_or_else(|| PathBuf::from("."));
    fs::create_dir_all(&out_dir)?;
    let out_path = out_dir.join(Path::new(delivery.name()).file_name().unwrap_or_default());
    fs::write(&out_path, delivery.bytes())?;

    if let Delivery::Single(file) = &delivery {
        info!("{} -> {}", file.source_name, out_path.display());
    }
    println!(
        "{} arquivo(s) prontos, {} itens: {}",
        processed,
        total_records,
        out_path.display()
    );
    Ok(processed)
}

/// 入力ファイルを読み込む
///
/// 読み込めないパスはスキップとして記録し、残りのファイルの処理は続けます。
fn read_inputs(paths: &[PathBuf]) -> (Vec<InputFile>, Vec<SkippedFile>) {
    let mut inputs = Vec::new();
    let mut unreadable = Vec::new();

    for path in paths {
        let name = display_name(path);
        match fs::read(path) {
            Ok(bytes) => inputs.push(InputFile::new(name, bytes)),
            Err(e) => {
                warn!("cannot read {}: {}", path.display(), e);
                unreadable.push(SkippedFile {
                    name,
                    reason: e.to_string(),
                });
            }
        }
    }

    (inputs, unreadable)
}

fn print_skipped(skipped: &SkippedFile) {
    eprintln!(
        "Falha ao processar {} - formato inesperado ou ausência de dados detectada. ({})",
        skipped.name, skipped.reason
    );
}

/// 入力パスからファイル名部分を取り出す
fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn handle_error(error: SibsError) {
    match error {
        SibsError::Io(io_err) => {
            eprintln!("I/O Error: {}", io_err);
            eprintln!("Please check that the file exists and you have permission to access it.");
        }
        SibsError::Json(json_err) => {
            eprintln!("Layout Error: {}", json_err);
            eprintln!("The layout file must be a JSON object (see SibsLayout).");
        }
        SibsError::Config(msg) => {
            eprintln!("Configuration Error: {}", msg);
        }
        other => eprintln!("Error: {}", other),
    }
}

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("sibsclean");

    let options = match parse_args(&args) {
        Ok(options) => options,
        Err(msg) => {
            eprintln!("Error: {}", msg);
            print_usage(program);
            process::exit(2);
        }
    };

    match run(&options) {
        Ok(0) => process::exit(1),
        Ok(_) => {}
        Err(e) => {
            handle_error(e);
            process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        std::iter::once("sibsclean")
            .chain(list.iter().copied())
            .map(String::from)
            .collect()
    }

    #[test]
    fn test_parse_args_flags() {
        let options = parse_args(&args(&[
            "--billing",
            "a.xls",
            "--out-dir",
            "out",
            "b.xlsx",
            "--keywords",
            "mil, sod,,agua",
        ]))
        .unwrap();

        assert!(options.billing);
        assert!(!options.no_format);
        assert_eq!(options.inputs, vec![PathBuf::from("a.xls"), PathBuf::from("b.xlsx")]);
        assert_eq!(options.out_dir, Some(PathBuf::from("out")));
        assert_eq!(
            options.keywords,
            Some(vec!["mil".to_string(), "sod".to_string(), "agua".to_string()])
        );
    }

    #[test]
    fn test_parse_args_errors() {
        assert!(parse_args(&args(&[])).is_err());
        assert!(parse_args(&args(&["--out-dir"])).is_err());
        assert!(parse_args(&args(&["--bogus", "a.xls"])).is_err());
    }

    fn write_report(path: &Path) {
        let mut workbook = rust_xlsxwriter::Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.write_string(0, 0, "Código").unwrap();
        worksheet.write_string(1, 4, "Soda 2L").unwrap();
        worksheet.write_number(1, 12, 20000.0).unwrap();
        worksheet.write_number(1, 19, 70.0).unwrap();
        workbook.save(path).unwrap();
    }

    #[test]
    fn test_read_inputs_skips_missing_paths() {
        let dir = tempfile::tempdir().unwrap();
        let jan = dir.path().join("jan.xlsx");
        let fev = dir.path().join("fev.xlsx");
        write_report(&jan);
        write_report(&fev);

        let paths = vec![jan, dir.path().join("ausente.xls"), fev];
        let (inputs, unreadable) = read_inputs(&paths);

        let names: Vec<&str> = inputs.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["jan.xlsx", "fev.xlsx"]);
        assert_eq!(unreadable.len(), 1);
        assert_eq!(unreadable[0].name, "ausente.xls");
    }

    #[test]
    fn test_run_continues_past_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let jan = dir.path().join("jan.xlsx");
        let fev = dir.path().join("fev.xlsx");
        write_report(&jan);
        write_report(&fev);
        let out_dir = dir.path().join("saida");

        let options = Options {
            inputs: vec![jan, dir.path().join("ausente.xls"), fev],
            out_dir: Some(out_dir.clone()),
            ..Options::default()
        };

        assert_eq!(run(&options).unwrap(), 2);
        assert!(out_dir.join("SIBS_LIMPAS.zip").exists());
    }

    #[test]
    fn test_run_with_only_missing_inputs() {
        let dir = tempfile::tempdir().unwrap();
        let options = Options {
            inputs: vec![dir.path().join("ausente.xls")],
            out_dir: Some(dir.path().to_path_buf()),
            ..Options::default()
        };

        assert_eq!(run(&options).unwrap(), 0);
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name(Path::new("/tmp/rel/jan.xls")), "jan.xls");
        assert_eq!(display_name(Path::new("fev.xlsx")), "fev.xlsx");
    }
}
