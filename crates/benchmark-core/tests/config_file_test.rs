//! Loading report configuration from disk

use benchmark_core::{Benchmark, BenchmarkConfig, FixedMemory};
use std::io::Write;
use std::sync::Arc;

#[test]
fn test_config_file_drives_report_format() {
    let path = std::env::temp_dir().join(format!("benchmark-config-{}.toml", std::process::id()));
    {
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "display = true").unwrap();
        writeln!(file, "memory_format = \"%.1f %s\"").unwrap();
        writeln!(file, "date_format = \"%d/%m/%Y\"").unwrap();
    }

    let config = BenchmarkConfig::from_file(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    let mut bench = Benchmark::builder()
        .memory_probe(Arc::new(FixedMemory::new(1536, 1536)))
        .config(config)
        .build()
        .unwrap();
    let report = bench.start().stop_default().unwrap();

    assert!(report.contains("<pre id=\"bench\">"));
    assert!(report.contains("    Memory Usage: 1.5 Kb\r\n"));
    assert!(report.contains("     Peak Memory: 1.500Kb (or 1536 bytes)\r\n"));
    let date_line = report.lines().find(|line| line.contains("Date:")).unwrap();
    assert_eq!(date_line.trim().len(), "Date: 01/01/2024".len());
}

#[test]
fn test_offset_date_layout_rejected_before_stop() {
    let config = BenchmarkConfig { date_format: "%Y-%m-%d %z".to_string(), ..Default::default() };
    assert!(config.validate().is_err());

    let err = Benchmark::builder()
        .memory_probe(Arc::new(FixedMemory::new(1, 1)))
        .config(config)
        .build()
        .unwrap_err();
    assert_eq!(err.code(), "bench-B401");
}
