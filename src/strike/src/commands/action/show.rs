use crate::lib::environment::Environment;
use crate::lib::error::StrikeResult;
use crate::lib::registry::security_gate;
use clap::Parser;
use serde::Serialize;
use strike_core::action::spec::TypedActionParameter;
use strike_core::action::{ActionComponent, ActionResolver, ComponentKind};
use strike_core::security::{Disclaimer, SecurityAssessment};

/// Resolves an action link and shows its classification and components.
#[derive(Parser)]
pub struct ShowOpts {
    /// An action URL, an `icp-action:` link, or a page that links to one.
    url: String,

    /// Print the result as JSON.
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ShowOutput<'a> {
    url: String,
    origin: Option<String>,
    title: &'a str,
    description: &'a str,
    canister_id: &'a str,
    disabled: bool,
    completed: bool,
    security: &'a SecurityAssessment,
    components: Vec<ComponentOutput<'a>>,
}

#[derive(Serialize)]
struct ComponentOutput<'a> {
    index: usize,
    kind: &'static str,
    label: &'a str,
    parameters: &'a [TypedActionParameter],
}

pub async fn exec(env: &dyn Environment, opts: ShowOpts) -> StrikeResult {
    let resolver = ActionResolver::new(env.get_logger().clone())?;
    let resolved = resolver.resolve(&opts.url).await?;
    let client = env.new_client()?;
    let gate = security_gate(env, &client).await?;
    let assessment = gate.evaluate(&resolved.action, resolved.origin.as_ref()).await;

    let action = &resolved.action;
    let output = ShowOutput {
        url: action.url.to_string(),
        origin: resolved.origin.as_ref().map(|origin| origin.url().to_string()),
        title: &action.title,
        description: &action.description,
        canister_id: &action.canister_id,
        disabled: action.disabled,
        completed: action.is_completed(),
        security: &assessment,
        components: action.components().iter().map(component_output).collect(),
    };
    if opts.json {
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("{}", output.title);
    if !output.description.is_empty() {
        println!("{}", output.description);
    }
    println!("Canister: {}", output.canister_id);
    if let Some(origin) = &output.origin {
        println!("Found through: {}", origin);
    }
    println!(
        "Security: {}{}",
        assessment.overall,
        match assessment.disclaimer {
            Some(Disclaimer::Blocked { ignorable: false }) => " (blocked)",
            Some(Disclaimer::Blocked { ignorable: true }) => " (malicious, allowed by policy)",
            Some(Disclaimer::Unknown { .. }) if !assessment.passes => " (needs --ignore-warnings)",
            _ => "",
        }
    );
    if output.completed {
        println!("This action has been completed.");
    } else if output.disabled {
        println!("This action is disabled.");
    }
    if let Some(error) = &action.error {
        println!("Error: {}", error.message);
    }
    for component in &output.components {
        println!("  [{}] {} \"{}\"", component.index, component.kind, component.label);
        for parameter in component.parameters {
            println!(
                "      --param {}=<{:?}>{}",
                parameter.name,
                parameter.kind,
                if parameter.required { " (required)" } else { "" }
            );
        }
    }
    Ok(())
}

fn component_output(component: &ActionComponent) -> ComponentOutput<'_> {
    ComponentOutput {
        index: component.index(),
        kind: match component.kind() {
            ComponentKind::Button => "button",
            ComponentKind::SingleValue => "input",
            ComponentKind::MultiValue => "choice",
            ComponentKind::Form => "form",
        },
        label: component.label(),
        parameters: component.parameters(),
    }
}
