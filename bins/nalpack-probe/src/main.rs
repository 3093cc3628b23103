//! nalpack-probe - H.264 Annex B 码流数据包探测工具
//!
//! 按固定块大小读取输入 (文件或 stdin), 增量送入 `PacketFinder`,
//! 输出每个访问单元数据包的信息与汇总统计.

mod logging;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use std::fs::File;
use std::io::{self, Read};
use std::num::NonZeroUsize;
use std::process;

use nalpack_codec::{Packet, PacketFinder};

/// H.264 Annex B 码流数据包探测工具
#[derive(Parser, Debug)]
#[command(name = "nalpack-probe", version, about = "H.264 Annex B 码流数据包探测工具")]
struct Cli {
    /// 输入文件路径 ("-" 表示 stdin)
    input: String,

    /// 每次送入的字节数
    #[arg(long, default_value = "4096")]
    chunk_size: NonZeroUsize,

    /// 显示每个数据包
    #[arg(long)]
    show_packets: bool,

    /// 输出 JSON 格式
    #[arg(long)]
    json: bool,

    /// 静默模式 (只输出探测结果)
    #[arg(short, long)]
    quiet: bool,

    /// 日志级别 (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

// ============================================================
// 输出结构体
// ============================================================

/// 完整探测结果
#[derive(Debug, Serialize)]
struct ProbeOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    packets: Option<Vec<PacketInfo>>,
    summary: Summary,
}

/// 单个数据包信息
#[derive(Debug, Serialize)]
struct PacketInfo {
    index: u64,
    offset: u64,
    nal_type: String,
    keyframe: bool,
    size: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    sps_size: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pps_size: Option<usize>,
}

/// 汇总统计
#[derive(Debug, Default, Serialize)]
struct Summary {
    input_bytes: u64,
    total_packets: u64,
    keyframes: u64,
    payload_bytes: u64,
    /// 缺少 SPS 或 PPS 的数据包数
    packets_without_parameter_sets: u64,
}

// ============================================================
// 主逻辑
// ============================================================

fn main() {
    let cli = Cli::parse();
    if let Err(e) = logging::init("nalpack-probe", cli.verbose, cli.quiet) {
        eprintln!("警告: 日志初始化失败: {e:#}");
    }

    if let Err(e) = run(&cli) {
        tracing::error!("探测失败: {e:#}");
        eprintln!("错误: {e:#}");
        process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    if !cli.quiet {
        eprintln!(
            "nalpack-probe 版本 {} -- H.264 Annex B 数据包探测",
            env!("CARGO_PKG_VERSION")
        );
        eprintln!("输入: {}", cli.input);
    }

    let reader: Box<dyn Read> = if cli.input == "-" {
        Box::new(io::stdin().lock())
    } else {
        let file = File::open(&cli.input)
            .with_context(|| format!("无法打开文件 '{}'", cli.input))?;
        Box::new(file)
    };

    let output = probe(reader, cli.chunk_size.get(), cli.show_packets)?;
    tracing::info!(
        "探测完成: input_bytes={}, packets={}, keyframes={}",
        output.summary.input_bytes,
        output.summary.total_packets,
        output.summary.keyframes
    );

    if cli.json {
        let json = serde_json::to_string_pretty(&output).context("JSON 序列化失败")?;
        println!("{json}");
    } else {
        print_text(&output);
    }
    Ok(())
}

/// 按块读取并组包
fn probe<R: Read>(mut reader: R, chunk_size: usize, keep_packets: bool) -> Result<ProbeOutput> {
    let mut finder = PacketFinder::new(&[]);
    let mut summary = Summary::default();
    let mut packets = keep_packets.then(Vec::new);

    loop {
        let n = finder
            .stream_mut()
            .fill_from(&mut reader, chunk_size)
            .context("读取输入失败")?;
        if n == 0 {
            break;
        }
        summary.input_bytes += n as u64;
        for pkt in finder.packets() {
            record(&mut summary, packets.as_mut(), &pkt);
        }
    }

    for pkt in finder.flush() {
        record(&mut summary, packets.as_mut(), &pkt);
    }

    if finder.buffered_len() > 0 {
        tracing::warn!(
            "码流末尾有 {} 字节未能组成数据包",
            finder.buffered_len()
        );
    }

    Ok(ProbeOutput { packets, summary })
}

fn record(summary: &mut Summary, packets: Option<&mut Vec<PacketInfo>>, pkt: &Packet) {
    if let Some(list) = packets {
        list.push(PacketInfo {
            index: summary.total_packets,
            offset: pkt.offset(),
            nal_type: pkt.nal_type().to_string(),
            keyframe: pkt.is_keyframe(),
            size: pkt.size(),
            sps_size: pkt.sps().map(|b| b.len()),
            pps_size: pkt.pps().map(|b| b.len()),
        });
    }
    summary.total_packets += 1;
    summary.payload_bytes += pkt.size() as u64;
    if pkt.is_keyframe() {
        summary.keyframes += 1;
    }
    if pkt.sps().is_none() || pkt.pps().is_none() {
        summary.packets_without_parameter_sets += 1;
    }
}

fn print_text(output: &ProbeOutput) {
    if let Some(packets) = &output.packets {
        println!("[PACKETS]");
        for p in packets {
            println!(
                "#{:<6} offset={:<10} type={:<5} key={} size={} sps={} pps={}",
                p.index,
                p.offset,
                p.nal_type,
                u8::from(p.keyframe),
                p.size,
                p.sps_size.map_or("-".to_string(), |n| n.to_string()),
                p.pps_size.map_or("-".to_string(), |n| n.to_string()),
            );
        }
        println!("[/PACKETS]");
    }

    let s = &output.summary;
    println!("[SUMMARY]");
    println!("input_bytes={}", s.input_bytes);
    println!("total_packets={}", s.total_packets);
    println!("keyframes={}", s.keyframes);
    println!("payload_bytes={}", s.payload_bytes);
    println!(
        "packets_without_parameter_sets={}",
        s.packets_without_parameter_sets
    );
    println!("[/SUMMARY]");
}
