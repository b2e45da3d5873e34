use std::env;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Creates benchmark log files with the specified number of lines.
/// Lines rotate through every format the classifier recognises so each rule
/// gets exercised.
fn main() -> io::Result<()> {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();
    if args.len() != 3 {
        eprintln!("Usage: {} <number-of-lines> <output-file>", args[0]);
        std::process::exit(1);
    }

    let num_lines: usize = match args[1].parse() {
        Ok(n) => n,
        Err(_) => {
            eprintln!("Invalid number of lines: {}", args[1]);
            std::process::exit(1);
        }
    };
    let file_path = &args[2];

    println!("Creating log file with {} lines at {}", num_lines, file_path);
    create_benchmark_logs(num_lines, file_path)?;
    println!("Log file created successfully.");

    Ok(())
}

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

const DAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

const MESSAGES: [&str; 10] = [
    "Connection timeout in NetworkClient",
    "Database query took 2.3s",
    "Application started successfully",
    "Session created for user_123",
    "Failed to process request: invalid parameters",
    "Cache miss for key: user_profile_123",
    "API rate limit exceeded for client_789",
    "Memory usage at 75% of allocated heap",
    "Certificate expiring in 30 days",
    "Configuration loaded from /etc/app/config.php",
];

fn format_line(i: usize) -> String {
    let day = (i % 28) + 1;
    let hour = (i / 3600) % 24;
    let minute = (i / 60) % 60;
    let second = i % 60;
    let month = MONTHS[i % 12];
    let message = MESSAGES[i % MESSAGES.len()];

    match i % 8 {
        0 => format!(
            "192.168.{}.{} - - [{:02}/{}/2025:{:02}:{:02}:{:02} +0000] \"GET /api/items/{} HTTP/1.1\" {} {} \"-\" \"Mozilla/5.0 (X11; Linux x86_64)\"",
            i % 256,
            (i / 256) % 256,
            day,
            month,
            hour,
            minute,
            second,
            i,
            [200, 301, 404, 500][i % 4],
            1000 + i % 4096
        ),
        1 => format!(
            "[{} {} {:02} {:02}:{:02}:{:02}.{:06} 2025] [php:error] [pid {}] [client 10.0.0.{}:{}] AH01071: {}",
            DAYS[i % 7],
            month,
            day,
            hour,
            minute,
            second,
            i % 1_000_000,
            1000 + i % 9000,
            i % 256,
            40000 + i % 20000,
            message
        ),
        2 => format!(
            "[{} {} {:02} {:02}:{:02}:{:02} 2025] [{}] {}",
            DAYS[i % 7],
            month,
            day,
            hour,
            minute,
            second,
            ["error", "warn", "notice"][i % 3],
            message
        ),
        3 => format!(
            "[{:02}-{}-2025 {:02}:{:02}:{:02} UTC] PHP {}:  {} in /var/www/index.php on line {}",
            day,
            month,
            hour,
            minute,
            second,
            ["Fatal error", "Warning", "Notice", "Deprecated"][i % 4],
            message,
            i % 500
        ),
        4 => format!(
            "[2025-03-{:02} {:02}:{:02}:{:02}] [{}] {}",
            day,
            hour,
            minute,
            second,
            ["ERROR", "WARN", "INFO", "DEBUG"][i % 4],
            message
        ),
        5 => format!(
            "2025-03-{:02}T{:02}:{:02}:{:02}Z worker-{} ERROR {}",
            day,
            hour,
            minute,
            second,
            i % 16,
            message
        ),
        6 => format!("[{}] [{}] [module-{}] {}", i, ["CRITICAL", "notice"][i % 2], i % 7, message),
        _ => format!("plain output line {} {}", i, message),
    }
}

/// Create a log file mixing access, Apache error, PHP and generic lines.
fn create_benchmark_logs(lines: usize, file_path: &str) -> io::Result<()> {
    // Create output directory if needed
    if let Some(parent) = Path::new(file_path).parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut file = BufWriter::new(File::create(file_path)?);

    for i in 0..lines {
        writeln!(file, "{}", format_line(i))?;
    }

    file.flush()
}
