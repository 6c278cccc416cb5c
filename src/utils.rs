use chrono::{ DateTime, Local };
use std::{ fs, io::Error, time::SystemTime };
use uuid::Uuid;

mod algo;
pub use algo::*;

/// ファイル名を指定し、ファイルをString形式で読み込む
/// Result型なので、この関数の外側でエラーハンドリングを行うこと
pub fn read_file(filepath: &str) -> Result<String, Error> {
    let file_contents = fs::read_to_string(filepath)?;
    Ok(file_contents)
}

/// タイムスタンプとUUIDの一部を使用し、IDを生成する
/// 形式は、%Y%m%d-%H%M%S_UUID末尾8文字
/// (v7の先頭はミリ秒時刻なので，乱数部の末尾を使う)
pub fn generate_id() -> String {
    let current_time = SystemTime::now();
    let timestamp: DateTime<Local> = current_time.into();
    let time_str = timestamp.format("%Y%m%d-%H%M%S").to_string();

    let uuid = generate_uuid().simple().to_string();

    format!("{}_{}", time_str, &uuid[uuid.len() - 8..])
}

/// UUIDを生成する
pub fn generate_uuid() -> Uuid {
    Uuid::now_v7()
}

pub fn now_string() -> String {
    let timestamp: DateTime<Local> = SystemTime::now().into();
    timestamp.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// CSV形式のエッジリスト (u,v[,weight]) を読み込む
/// 解析できなかった行番号 (1始まり) を返す
pub fn string_to_weighted_edges(data: &str) -> Result<Vec<(usize, usize, f64)>, usize> {
    let mut o = vec![];

    for (line_index, l) in data.trim().lines().enumerate() {
        let l = l.trim();
        if l.is_empty() || l.starts_with('#') {
            continue;
        }

        let values: Vec<&str> = l.split(',').map(|v| v.trim()).collect();
        let parsed = match values.as_slice() {
            [u, v] => u.parse().ok().zip(v.parse().ok()).map(|(u, v)| (u, v, 1.0)),
            [u, v, w] => match (u.parse(), v.parse(), w.parse::<f64>()) {
                (Ok(u), Ok(v), Ok(w)) if w > 0.0 => Some((u, v, w)),
                _ => None,
            },
            _ => None,
        };

        match parsed {
            Some(edge) => o.push(edge),
            None => return Err(line_index + 1),
        }
    }

    Ok(o)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_edge_list() {
        let text = "# nsf\n0,1\n1, 2, 12.5\n\n2,3,25\n";
        assert_eq!(
            string_to_weighted_edges(text).unwrap(),
            vec![(0, 1, 1.0), (1, 2, 12.5), (2, 3, 25.0)]
        );
        assert_eq!(string_to_weighted_edges("0,1\n1;2\n"), Err(2));
        assert_eq!(string_to_weighted_edges("0,1,-3\n"), Err(1));
    }

    #[test]
    fn ids_are_distinct() {
        use itertools::Itertools;

        let ids: Vec<String> = (0..5).map(|_| generate_id()).collect();
        assert!(ids.iter().all_unique(), "{:?}", ids);
        assert!(ids.iter().all(|id| id.len() == "20261017-215943_".len() + 8));
    }
}
