use serde::Serialize;

use super::table::{Column, Table};
use super::{format_output, hub_lister};
use crate::config::Config;
use crate::hub::content::display_value;
use crate::hub::{HubContent, RegistryIndex};
use crate::{die, ListArgs};

/// A hub entry as shown by `hubsync list`.
#[derive(Serialize, Debug, PartialEq)]
struct HubModel {
    name: String,
    version: Option<String>,
    upstream_id: Option<String>,
    upstream_version: Option<String>,
    status: Option<String>,
}

impl From<&HubContent> for HubModel {
    fn from(content: &HubContent) -> Self {
        let tag = content.upstream_tag();

        HubModel {
            name: content.name.clone(),
            version: content.native_version().map(str::to_string),
            upstream_id: tag.as_ref().map(|t| t.model_id.clone()),
            upstream_version: tag.map(|t| t.version),
            status: content.status.as_ref().map(display_value),
        }
    }
}

fn or_dash(value: Option<String>) -> String {
    value.unwrap_or_else(|| "-".to_string())
}

impl From<Vec<HubModel>> for Table {
    fn from(models: Vec<HubModel>) -> Self {
        let mut tab = Table::new(vec![
            Column::left("NAME"),
            Column::left("VERSION"),
            Column::left("UPSTREAM_ID"),
            Column::left("UPSTREAM_VERSION"),
            Column::left("STATUS"),
        ]);

        for model in models {
            tab.add_row(vec![
                model.name,
                or_dash(model.version),
                or_dash(model.upstream_id),
                or_dash(model.upstream_version),
                or_dash(model.status),
            ]);
        }

        tab
    }
}

/// Upstream entries are shown once per upstream model id, the same entry
/// reconciliation compares against. With `all`, every readable record is
/// shown in listing order.
fn hub_models(contents: Vec<HubContent>, all: bool) -> Vec<HubModel> {
    if all {
        return contents.iter().map(HubModel::from).collect();
    }

    let index = RegistryIndex::from_contents(contents);

    index.iter().map(|(_, content)| HubModel::from(content)).collect()
}

pub(crate) async fn list_cmd(config: &Config, args: &ListArgs) {
    let lister = hub_lister(config, &args.sources, args.listing.as_ref());

    let raw = match lister.list_models().await {
        Ok(raw) => raw,
        Err(err) => die!("failed to list hub contents: {}", err),
    };

    let contents: Vec<HubContent> = raw.iter().filter_map(HubContent::parse).collect();

    format_output(hub_models(contents, args.all), args.format);
}
