//! RWA/WDM admission simulator
//!
//! 波長分割多重ネットワークにおける経路・波長割当 (RWA) の呼損率評価を行う
//!
//! - 補助グラフ (仮想リンク) による経路探索と物理経路への展開
//! - first-fit 波長割当と，波長が足りないリンクでの鍵プール代替
//! - 離散時間の呼受付ループと呼損率の集計

pub mod config;
pub mod controller;
pub mod debugger;
pub mod error;
pub mod np_core;
pub mod topology;
pub mod utils;

pub use np_core::{ Edge, LinkAssignment, Node, SD };
