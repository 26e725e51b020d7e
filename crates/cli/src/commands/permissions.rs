use fra_portal::{Role, dashboard_path, navigation_tabs, permissions};

use super::ExitCode;

#[derive(clap::Args)]
pub struct Args {
    /// Role tag, e.g. `government` or `ministry_tribal`. Omit for signed-out visitors.
    #[arg(short, long)]
    pub role: Option<String>,
}

pub async fn main(args: Args) -> anyhow::Result<ExitCode> {
    let role = match args.role.as_deref().map(Role::parse_tag) {
        None => None,
        Some(Ok(role)) => Some(role),
        Some(Err(err)) => {
            eprintln!("{}", err);
            return Ok(ExitCode::FaultOrArgsError);
        }
    };

    let perms = permissions(role);
    let table = serde_json::to_value(perms)?;
    let Some(entries) = table.as_object() else {
        anyhow::bail!("Permission table is not an object");
    };

    println!(
        "Role: {}",
        role.map(|r| r.as_str()).unwrap_or("(signed out)")
    );
    println!("Dashboard: {}", dashboard_path(role));
    for (name, value) in entries {
        match value {
            serde_json::Value::Bool(granted) => {
                println!(" - {:<28} {}", name, if *granted { "yes" } else { "no" })
            }
            other => println!(" - {:<28} {}", name, other),
        }
    }

    let tabs: Vec<&str> = navigation_tabs(role).iter().map(|t| t.as_str()).collect();
    println!("Tabs: {}", tabs.join(", "));
    Ok(ExitCode::Ok)
}
