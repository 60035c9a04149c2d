use storm_core::{build_dispatcher, Config, ToolSet};
use storm_tools::{ToolDescriptor, ToolDispatcher};

pub fn run(config: &Config, name: Option<&str>) -> anyhow::Result<()> {
    let (dispatcher, _) = build_dispatcher(config, ToolSet::All)?;

    match name {
        Some(name) => print_tool_detail(&dispatcher, name)?,
        None => print_tool_list(&dispatcher),
    }

    Ok(())
}

fn print_tool_list(dispatcher: &ToolDispatcher) {
    let tools = dispatcher.list_tools();

    println!("Published tools ({}):", tools.len());
    for tool in &tools {
        println!("{} [{}] - {}", tool.name, tool_kind(&tool.name), first_line(tool));
    }
}

fn print_tool_detail(dispatcher: &ToolDispatcher, name: &str) -> anyhow::Result<()> {
    let tool = dispatcher
        .registry()
        .descriptor(name)
        .ok_or_else(|| anyhow::anyhow!("Unknown tool: {name}"))?;
    let schema = serde_json::to_string_pretty(&tool.input_schema)?;

    println!("name: {}", tool.name);
    println!("kind: {}", tool_kind(&tool.name));
    println!("description: {}", tool.description);
    println!("inputSchema:");
    println!("{schema}");

    Ok(())
}

fn first_line(tool: &ToolDescriptor) -> &str {
    tool.description.lines().next().unwrap_or_default()
}

fn tool_kind(name: &str) -> &'static str {
    if matches!(
        name,
        "upload_file" | "search_files" | "read_file" | "list_directory"
    ) {
        "file"
    } else {
        "platform"
    }
}

#[cfg(test)]
mod tests {
    use super::tool_kind;

    #[test]
    fn test_tool_kind_file() {
        assert_eq!(tool_kind("search_files"), "file");
    }

    #[test]
    fn test_tool_kind_platform() {
        assert_eq!(tool_kind("list_agents"), "platform");
    }
}
