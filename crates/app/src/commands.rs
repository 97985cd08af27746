//! Subcommand implementations.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, bail};
use futures::StreamExt;
use orads_application::ports::SettingsRepository;
use orads_application::use_cases::{
    CheckHealth, FetchVariableValues, FetchVariableValuesInput, HealthStatus, PreviewQuery,
    RunQuery, UpdateSettings, UpdateSettingsInput,
};
use orads_application::{
    DataSource, DataSourceVariableSupport, GlobalScopeTransport, TemplateSrv, VariableSupport,
};
use orads_domain::{Query, QueryRequest};
use orads_infrastructure::{
    BackendConfig, BackendQueryTransport, FileSettingsRepository, to_json_stable,
};
use tracing::info;

use crate::args::{BackendArgs, ConfigureArgs, DashboardArgs, PreviewArgs, QueryArgs, build_scope};

type OracleDataSource =
    DataSource<TemplateSrv, GlobalScopeTransport<TemplateSrv, BackendQueryTransport>>;

fn template_srv(dashboard: &DashboardArgs) -> anyhow::Result<TemplateSrv> {
    Ok(TemplateSrv::with_variables(dashboard.globals()?).with_time_range(dashboard.range()))
}

async fn datasource(
    config_dir: &Path,
    dashboard: &DashboardArgs,
    backend: &BackendArgs,
) -> anyhow::Result<OracleDataSource> {
    let settings = FileSettingsRepository::new()
        .load(config_dir)
        .await
        .with_context(|| format!("loading settings from {}", config_dir.display()))?;

    let mut config = BackendConfig::new(backend.grafana_url.clone(), settings.uid.clone());
    config.api_token.clone_from(&backend.api_token);
    config.timeout = backend.timeout();
    let http = Arc::new(BackendQueryTransport::new(config)?);

    let resolver = Arc::new(template_srv(dashboard)?);
    let transport = GlobalScopeTransport::new(Arc::clone(&resolver), http);
    Ok(DataSource::new(&settings, resolver, Arc::new(transport)))
}

/// Ref ids the host assigns to targets: A..Z, then AA, AB, ...
fn ref_id(index: usize) -> String {
    let mut id = String::new();
    let mut n = index;
    loop {
        let letter = b'A' + u8::try_from(n % 26).unwrap_or(0);
        id.insert(0, char::from(letter));
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }
    id
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    print!("{}", to_json_stable(value)?);
    Ok(())
}

pub async fn query(config_dir: &Path, args: QueryArgs) -> anyhow::Result<()> {
    let ds = Arc::new(datasource(config_dir, &args.dashboard, &args.backend).await?);

    let targets = args
        .sql
        .into_iter()
        .enumerate()
        .map(|(i, sql)| Query::with_sql(ref_id(i), sql))
        .collect();
    let mut request = QueryRequest::new(targets, args.dashboard.range());
    request.scoped_vars = Some(build_scope(&args.vars)?);

    let mut responses = RunQuery::new(ds).execute(request);
    while let Some(response) = responses.next().await {
        print_json(&response?)?;
    }
    Ok(())
}

pub fn preview(args: &PreviewArgs) -> anyhow::Result<()> {
    let preview = PreviewQuery::new(Arc::new(template_srv(&args.dashboard)?));
    println!("{}", preview.execute(&args.sql));
    Ok(())
}

pub async fn variable_values(config_dir: &Path, args: QueryArgs) -> anyhow::Result<()> {
    let ds = Arc::new(datasource(config_dir, &args.dashboard, &args.backend).await?);
    let sql = args.sql.join("\n");

    let values = FetchVariableValues::new(ds)
        .execute(FetchVariableValuesInput {
            query: Query::with_sql("A", sql),
            range: args.dashboard.range(),
            scoped_vars: Some(build_scope(&args.vars)?),
        })
        .await?;

    info!(count = values.len(), "variable values fetched");
    print_json(&values)
}

pub async fn health(config_dir: &Path) -> anyhow::Result<()> {
    let result = CheckHealth::new(Arc::new(FileSettingsRepository::new()), config_dir)
        .execute()
        .await;
    print_json(&result)?;
    if result.status == HealthStatus::Error {
        bail!(result.message);
    }
    Ok(())
}

pub async fn configure(config_dir: &Path, args: ConfigureArgs) -> anyhow::Result<()> {
    let edits = args.edits();
    let saved = UpdateSettings::new(Arc::new(FileSettingsRepository::new()))
        .execute(UpdateSettingsInput {
            location: config_dir.to_path_buf(),
            uid: args.uid,
            name: args.name,
            edits,
        })
        .await?;
    print_json(&saved)
}

pub fn variable_support() {
    println!("{}", DataSourceVariableSupport::new().support_type());
}
