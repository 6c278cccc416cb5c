//! RWA/WDM admission simulator
//!
//! 設定ファイル (既定: ./config.toml) を読み込み，負荷ごとの呼損率を求める

use std::{ env, process };

use rwa_wdm_sim::{ config::Config, controller, utils };

fn main() {
    let args: Vec<String> = env::args().collect();
    let config_path = if args.len() == 2 { args[1].as_str() } else { "./config.toml" };

    let config = match Config::new(config_path) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("[ERROR] {config_path}: {err}");
            process::exit(1);
        }
    };

    let run_id = utils::generate_id();
    eprintln!("START: {}\tID: {}", utils::now_string(), run_id);
    eprintln!(
        "TOPOLOGY: {}\tCHANNELS: {}\tTHREADS: {}",
        config.network.topology, config.network.channels, config.simulation.threads
    );

    // スレッド数の確認
    let num_threads = num_cpus::get();
    if num_threads < config.simulation.threads {
        eprintln!("[WARNING] THREADS: {} is larger than num_cpus: {}.", config.simulation.threads, num_threads);
    }

    let result = match controller::main(&config, &run_id) {
        Ok(result) => result,
        Err(err) => {
            eprintln!("[ERROR] {err}");
            process::exit(1);
        }
    };

    print!("{:<8}", "Load:");
    for (load, _) in result.mean_blocking() {
        print!(" {:7}", load);
    }
    println!();
    print!("{:<8}", "BP (%):");
    for (_, mean) in result.mean_blocking() {
        match mean {
            Some(bp) => print!(" {:7.3}", bp),
            None => print!(" {:>7}", "-"),
        }
    }
    println!();
    if let Some(dir) = &result.result_dir {
        eprintln!("RESULT: {}/{}.bp", dir.display(), result.file_base);
        eprintln!("CONFIG: {}/config_{}.toml", dir.display(), result.run_id);
    }
}
