use serde_derive::{ Deserialize, Serialize };

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
/// トラフィック関連の設定
pub struct TrafficConfig {
    /// 送信元 (未指定ならトポロジ既定値)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<usize>,
    /// 宛先 (未指定ならトポロジ既定値)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<usize>,
    /// 呼ごとに送受信ノードを一様ランダムに選ぶか
    #[serde(default)]
    pub uniform_pairs: bool,
}
