use std::fs::{ self, create_dir_all, OpenOptions };
use std::io::Write;
use std::path::{ Path, PathBuf };

use crate::{
    config::Config,
    error::Result,
    utils::{ column_means, read_file },
};

/// 結果フォルダを作成し，そのパスを返す
pub fn init_result_dir(config: &Config) -> Result<PathBuf> {
    let result_dir = PathBuf::from(&config.simulation.result_dir);
    create_dir_all(&result_dir)?;
    Ok(result_dir)
}

/// One `.bp` line: ` %7.3f` per load level.
pub fn format_bp_line(blocking: &[f64]) -> String {
    blocking.iter().map(|bp| format!(" {:7.3}", bp)).collect()
}

/// One `.it` line: elapsed seconds of a repetition.
pub fn format_it_line(elapsed: f64) -> String {
    format!(" {:7.7}", elapsed)
}

fn append_line(path: &Path, line: &str) -> Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "{line}")?;
    Ok(())
}

/// `<dir>/<base>.bp` に1試行分の呼損率を追記する
pub fn append_bp(result_dir: &Path, file_base: &str, blocking: &[f64]) -> Result<PathBuf> {
    let path = result_dir.join(format!("{file_base}.bp"));
    append_line(&path, &format_bp_line(blocking))?;
    Ok(path)
}

/// `<dir>/<base>.it` に1試行分の経過時間を追記する
pub fn append_it(result_dir: &Path, file_base: &str, elapsed: f64) -> Result<PathBuf> {
    let path = result_dir.join(format!("{file_base}.it"));
    append_line(&path, &format_it_line(elapsed))?;
    Ok(path)
}

/// config構造体をファイルとして出力する
/// config構造体->TOMLデータ->文字列->ファイル (`config_<run_id>.toml`)
pub fn save_config(config: &Config, result_dir: &Path, run_id: &str) -> Result<PathBuf> {
    let toml_data = toml::Value::try_from(config)?;
    let toml_string = toml::to_string_pretty(&toml_data)?;

    let path = result_dir.join(format!("config_{run_id}.toml"));
    fs::write(&path, toml_string)?;
    Ok(path)
}

/// Parses `.bp` contents, one row per non-empty line.
///
/// Cells that are not numbers become `None`; rows keep their own length.
pub fn parse_bp_rows(contents: &str) -> Vec<Vec<Option<f64>>> {
    contents
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.split_whitespace().map(|cell| cell.parse::<f64>().ok()).collect())
        .collect()
}

pub fn read_bp_rows(path: &Path) -> Result<Vec<Vec<Option<f64>>>> {
    let contents = read_file(&path.to_string_lossy())?;
    Ok(parse_bp_rows(&contents))
}

/// Mean blocking probability per load level over all rows.
///
/// Load axis is rebuilt as `load_min + k * load_step`.
pub fn summarize(rows: &[Vec<Option<f64>>], load_min: usize, load_step: usize) -> Vec<(usize, Option<f64>)> {
    column_means(rows)
        .into_iter()
        .enumerate()
        .map(|(k, mean)| (load_min + k * load_step, mean))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::generate_id;

    #[test]
    fn bp_line_format() {
        assert_eq!(format_bp_line(&[0.0, 12.5, 100.0]), "   0.000  12.500 100.000");
        assert_eq!(format_it_line(1.5), " 1.5000000");
    }

    #[test]
    fn ragged_rows_are_averaged_per_column() {
        let rows = parse_bp_rows("   0.000  10.000  20.000\n\n   2.000  x\n   4.000\n");
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1], vec![Some(2.0), None]);

        let summary = summarize(&rows, 5, 10);
        assert_eq!(summary, vec![(5, Some(2.0)), (15, Some(10.0)), (25, Some(20.0))]);
    }

    #[test]
    fn append_keeps_one_line_per_repetition() {
        let dir = std::env::temp_dir().join(format!("rwa_wdm_sim_{}", generate_id()));
        create_dir_all(&dir).unwrap();

        append_bp(&dir, "dijkstra_first-fit_4ch", &[1.0, 2.0]).unwrap();
        let path = append_bp(&dir, "dijkstra_first-fit_4ch", &[3.0]).unwrap();
        append_it(&dir, "dijkstra_first-fit_4ch", 0.25).unwrap();

        let rows = read_bp_rows(&path).unwrap();
        assert_eq!(rows, vec![vec![Some(1.0), Some(2.0)], vec![Some(3.0)]]);

        let run_id = generate_id();
        let config_path = save_config(&Config::default(), &dir, &run_id).unwrap();
        assert_eq!(config_path, dir.join(format!("config_{run_id}.toml")));
        let saved = read_file(&config_path.to_string_lossy()).unwrap();
        assert!(saved.contains("[simulation]"));

        fs::remove_dir_all(&dir).unwrap();
    }
}
