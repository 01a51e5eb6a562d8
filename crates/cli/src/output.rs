//! Colored terminal output for one-shot commands.

use chrono::Utc;
use colored::ColoredString;
use colored::Colorize;
use fm_core::format::format_memory;
use fm_core::format::format_uptime;
use fm_protocol::config_models::DeclaredProcessConfig;
use fm_protocol::process_models::FleetSummary;
use fm_protocol::process_models::MergedProjectView;
use fm_protocol::process_models::ProcessStatus;

fn paint_status(status: ProcessStatus, padded: String) -> ColoredString {
    match status {
        ProcessStatus::Online => padded.green(),
        ProcessStatus::Launching => padded.cyan(),
        ProcessStatus::Stopping | ProcessStatus::Stopped => padded.yellow(),
        ProcessStatus::Errored => padded.red(),
        ProcessStatus::OneLaunchStatus => padded.magenta(),
        ProcessStatus::Undeployed | ProcessStatus::Unknown => padded.dimmed(),
    }
}

pub fn success(title: &str, message: &str) {
    println!("{} {}: {}", "✓".green(), title.bold(), message);
}

pub fn error(message: &str) {
    eprintln!("{} {}", "✗".red(), message);
}

pub fn daemon_status(running: bool) {
    let state = if running {
        "running".green()
    } else {
        "stopped".red()
    };
    println!("{} {}", "Daemon:".bold(), state);
}

pub fn summary(summary: &FleetSummary) {
    println!(
        "{} {}  {} {}  {} {}  {} {}  {} {}",
        "Total".bold(),
        summary.total,
        "Online".bold(),
        summary.online.to_string().green(),
        "Stopped".bold(),
        summary.stopped.to_string().yellow(),
        "Errored".bold(),
        summary.errored.to_string().red(),
        "Undeployed".bold(),
        summary.undeployed,
    );
    println!(
        "{} {:.1}%  {} {}",
        "CPU".bold(),
        summary.cpu_percent,
        "Memory".bold(),
        format_memory(summary.memory_bytes)
    );
}

pub fn process_table(views: &[MergedProjectView]) {
    if views.is_empty() {
        println!("No projects declared. Add one with `fleet projects add`.");
        return;
    }

    println!(
        "{}",
        format!(
            "{:<4} {:<24} {:<18} {:>7} {:>10} {:>8} {:<10}",
            "ID", "NAME", "STATUS", "CPU", "MEMORY", "RESTARTS", "UPTIME"
        )
        .bold()
    );
    let now = Utc::now();
    for view in views {
        let status = view.status();
        let status_cell = paint_status(status, format!("{:<18}", status.to_string()));
        match &view.live {
            Some(live) => {
                let uptime = match (status, live.uptime_start) {
                    (ProcessStatus::Online, Some(start)) => format_uptime(start, now),
                    _ => "-".to_string(),
                };
                println!(
                    "{:<4} {:<24} {} {:>6.1}% {:>10} {:>8} {:<10}",
                    live.id,
                    view.name(),
                    status_cell,
                    live.monitoring.cpu_percent,
                    format_memory(live.monitoring.memory_bytes),
                    live.restart_count,
                    uptime
                );
            }
            None => println!(
                "{:<4} {:<24} {} {:>7} {:>10} {:>8} {:<10}",
                "-",
                view.name(),
                status_cell,
                "-",
                "-",
                "-",
                "-"
            ),
        }
    }
}

pub fn project_list(projects: &[DeclaredProcessConfig]) {
    if projects.is_empty() {
        println!("No projects declared.");
        return;
    }
    for project in projects {
        println!(
            "{:<24} {} {}",
            project.name.bold(),
            project.path,
            project.script.dimmed()
        );
    }
}
