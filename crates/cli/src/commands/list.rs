use anyhow::Result;
use baton_core::pipeline::Pipeline;
use baton_core::results::TaskKind;
use baton_core::tasks::get_task_color;
use colored::*;

pub fn execute(pipeline: &Pipeline) -> Result<()> {
    let result = pipeline.list_tasks();

    let heading = match &result.pipeline_name {
        Some(name) => format!("Tasks ({})", name),
        None => "Tasks".to_string(),
    };
    println!("{}", heading.bold().underline());

    if result.tasks.is_empty() {
        println!("  {}", "No tasks found".dimmed());
        return Ok(());
    }

    for task in &result.tasks {
        let mut line = task.name.color(get_task_color(&task.name)).bold().to_string();
        if task.name == result.default_task {
            line.push_str(&format!(" {}", "[default]".green()));
        }
        if let Some(flag) = &task.selected_by {
            line.push_str(&format!(" {}", format!("[{}]", flag).yellow()));
        }
        println!("{}", line);

        if let Some(description) = &task.description {
            println!("  {}", description.dimmed());
        }
        match task.kind {
            TaskKind::Leaf => {}
            TaskKind::Sequence => {
                println!("  {} {}", "sequence:".dimmed(), task.members.join(" → "));
            }
            TaskKind::Parallel => {
                println!("  {} {}", "parallel:".dimmed(), task.members.join(", "));
            }
        }
    }

    Ok(())
}
