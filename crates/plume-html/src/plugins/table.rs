//! Table styles.

use plume_config::{ConfigSchema, PluginConfig};

use super::{HtmlContext, HtmlPlugin, edit_elements};
use crate::css::Declarations;
use crate::error::HtmlError;
use crate::tree::Element;

const STRIPE_BACKGROUND: &str = "#f8f8f8";

/// Styles tables, with optional zebra striping of body rows.
#[derive(Debug, Default, Clone, Copy)]
pub struct TablePlugin;

impl TablePlugin {
    /// Settings key.
    pub const NAME: &'static str = "table";
}

impl HtmlPlugin for TablePlugin {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn description(&self) -> &'static str {
        "Table styles and zebra striping"
    }

    fn schema(&self) -> ConfigSchema {
        ConfigSchema::new().switch("striped", "Shade every other body row", true)
    }

    fn process(
        &self,
        html: &str,
        config: &PluginConfig,
        ctx: &mut HtmlContext,
    ) -> Result<String, HtmlError> {
        let border = ctx.literal("--table-border");
        let table_style = format!(
            "width: 100%; margin: 1em 0; border-collapse: collapse; font-size: 14px; line-height: 1.6; color: {};",
            ctx.literal("--text-color")
        );
        let head_style = format!("background-color: {};", ctx.literal("--code-background"));
        let th_style = format!(
            "padding: 8px 12px; border: 1px solid {border}; font-weight: bold; text-align: left;"
        );
        let td_style = format!("padding: 8px 12px; border: 1px solid {border};");
        let striped = config.bool("striped");

        edit_elements(html, |el, _| {
            if el.is("table") {
                el.set_attr("style", table_style.as_str());
                stripe_rows(el, striped);
            } else if el.is("thead") {
                el.set_attr("style", head_style.as_str());
            } else if el.is("tbody") {
                stripe_rows(el, striped);
            } else if el.is("th") {
                set_cell_style(el, &th_style);
            } else if el.is("td") {
                set_cell_style(el, &td_style);
            }
        })
    }
}

/// Style the direct `tr` children of a `tbody` (or a `table` without one).
fn stripe_rows(parent: &mut Element, striped: bool) {
    for (i, row) in parent.child_elements_mut().filter(|c| c.is("tr")).enumerate() {
        if striped && i % 2 == 1 {
            row.set_attr("style", format!("background-color: {STRIPE_BACKGROUND};"));
        } else {
            row.remove_attr("style");
        }
    }
}

/// Overwrite a cell's style, keeping its column alignment.
fn set_cell_style(cell: &mut Element, base: &str) {
    let mut style = Declarations::parse(base);
    if let Some(align) = cell
        .attr("style")
        .and_then(|s| Declarations::parse(s).get("text-align").map(str::to_owned))
    {
        style.set("text-align", align);
    }
    cell.set_attr("style", style.to_string());
}

#[cfg(test)]
mod tests {
    use plume_config::LinkDescriptionMode;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::css::CssVariables;

    const TABLE: &str = r#"<table><thead><tr><th style="text-align: center;">A</th><th>B</th></tr></thead><tbody><tr><td>1</td><td style="text-align: right;">2</td></tr><tr><td>3</td><td>4</td></tr><tr><td>5</td><td>6</td></tr></tbody></table>"#;

    fn run(html: &str, striped: bool) -> String {
        let mut ctx = HtmlContext::new(true, LinkDescriptionMode::Link, CssVariables::with_defaults(None));
        let config = PluginConfig::with_defaults(&TablePlugin.schema()).with_value("striped", striped);
        TablePlugin.process(html, &config, &mut ctx).unwrap()
    }

    #[test]
    fn test_cells_keep_alignment() {
        let out = run(TABLE, true);
        assert!(out.contains(
            r#"<th style="padding: 8px 12px; border: 1px solid #dfe2e5; font-weight: bold; text-align: center;">A</th>"#
        ));
        assert!(out.contains(
            r#"<td style="padding: 8px 12px; border: 1px solid #dfe2e5; text-align: right;">2</td>"#
        ));
    }

    #[test]
    fn test_zebra_rows() {
        let out = run(TABLE, true);
        assert_eq!(out.matches(r#"<tr style="background-color: #f8f8f8;">"#).count(), 1);
        assert!(out.contains(r#"<tr style="background-color: #f8f8f8;"><td style="padding: 8px 12px; border: 1px solid #dfe2e5;">3</td>"#));
        assert_eq!(run(&out, true), out);
    }

    #[test]
    fn test_striping_off_removes_row_styles() {
        let striped = run(TABLE, true);
        let plain = run(&striped, false);
        assert!(!plain.contains("<tr style"));
    }
}
