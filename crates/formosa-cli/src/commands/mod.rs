use std::sync::Arc;

use serde_json::Value;
use time::Date;
use tracing::debug;

use formosa_core::{
    calendar, HttpClient, Market, ReqwestHttpClient, TaifexAdapter, TpexAdapter, TwseAdapter,
};

use crate::cli::{Cli, Command};
use crate::error::CliError;

pub async fn run(cli: &Cli) -> Result<Value, CliError> {
    let date = parse_date(cli.date.as_deref())?;
    debug!(?date, "dispatching command");

    let http_client: Arc<dyn HttpClient> = Arc::new(ReqwestHttpClient::new());

    let twse = TwseAdapter::default().with_http_client(Arc::clone(&http_client));
    let tpex = TpexAdapter::default().with_http_client(Arc::clone(&http_client));
    let taifex = TaifexAdapter::default().with_http_client(Arc::clone(&http_client));

    let value = match &cli.command {
        Command::Trades(args) => match Market::from(args.market) {
            Market::Tse => serde_json::to_value(twse.market_trades(date).await?)?,
            Market::Otc => serde_json::to_value(tpex.market_trades(date).await?)?,
        },
        Command::Breadth => serde_json::to_value(twse.market_breadth(date).await?)?,
        Command::Institutional => serde_json::to_value(twse.institutional_net_flow(date).await?)?,
        Command::Margin => serde_json::to_value(twse.margin_balance(date).await?)?,
        Command::FuturesOi => serde_json::to_value(taifex.institutional_futures_oi(date).await?)?,
        Command::MarketOi => serde_json::to_value(taifex.market_oi(date).await?)?,
        Command::OptionsOi => serde_json::to_value(taifex.institutional_options_oi(date).await?)?,
        Command::Retail => serde_json::to_value(taifex.retail_position(date).await?)?,
        Command::Instruments(args) => {
            serde_json::to_value(twse.listed_instruments(args.market.into()).await?)?
        }
    };

    Ok(value)
}

fn parse_date(raw: Option<&str>) -> Result<Option<Date>, CliError> {
    raw.map(calendar::parse_iso).transpose().map_err(CliError::from)
}
