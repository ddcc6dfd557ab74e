use anyhow::Result;
use baton_core::pipeline::Pipeline;
use baton_core::results::{TaskKind, TaskReport, TaskState};
use baton_core::tasks::get_task_color;
use colored::*;

pub async fn execute(pipeline: &Pipeline, task: Option<&str>) -> Result<()> {
    let task_name = task.unwrap_or_else(|| pipeline.default_task());

    println!(
        "┌─ {} {}",
        "Running task".bold(),
        task_name.color(get_task_color(task_name)).bold()
    );
    for (flag, set) in pipeline.context.flags().filter(|(_, set)| *set) {
        println!("└─ {} {}={}", "Context:".bright_black(), flag, set);
    }

    let report = pipeline.run(task_name).await?;

    println!();
    println!("{}", "Summary".bold().underline());
    print_report(&report.root, "");

    if report.is_success() {
        println!(
            "\n{} {}",
            "✓".green().bold(),
            format!("'{}' completed", task_name).green()
        );
    }

    report.into_result()?;
    Ok(())
}

fn print_report(report: &TaskReport, indent: &str) {
    let marker = match report.state {
        TaskState::Succeeded => "✓".green().bold(),
        TaskState::Failed => "✗".red().bold(),
        TaskState::Pending | TaskState::Running => "○".dimmed(),
    };
    let kind = match report.kind {
        TaskKind::Leaf => String::new(),
        TaskKind::Sequence => " (sequence)".dimmed().to_string(),
        TaskKind::Parallel => " (parallel)".dimmed().to_string(),
    };
    let timing = if report.state.is_terminal() {
        format!(" {} ms", report.elapsed.as_millis()).bright_black().to_string()
    } else {
        " not started".bright_black().to_string()
    };

    println!(
        "{}{} {}{}{}",
        indent,
        marker,
        report.name.color(get_task_color(&report.name)),
        kind,
        timing
    );

    let child_indent = format!("{}  ", indent);
    for child in &report.children {
        print_report(child, &child_indent);
    }
}
