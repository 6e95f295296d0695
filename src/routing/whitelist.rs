//! Read-only OLAP API calls the proxy lets through.

/// Paths forwarded on exact match.
pub const FORWARD_PATHS: &[&str] = &[
    "/server/change_password",
    "/server/databases",
    "/server/info",
    "/server/licenses",
    "/server/login",
    "/server/logout",
    "/server/user_info",
    "/database/cubes",
    "/database/dimensions",
    "/database/info",
    "/dimension/cubes",
    "/dimension/dfilter",
    "/dimension/element",
    "/dimension/elements",
    "/dimension/info",
    "/element/info",
    "/cube/holds",
    "/cube/info",
    "/cube/locks",
    "/cube/rules",
    "/cell/area",
    "/cell/drillthrough",
    "/cell/export",
    "/cell/value",
    "/cell/values",
    "/rule/functions",
    "/rule/info",
    "/rule/parse",
    "/svs/info",
    "/view/calculate",
    "/meta-sp",
    "/api",
    "/favicon.ico",
];

/// Paths forwarded on prefix match. Static assets of the web client.
pub const FORWARD_PREFIXES: &[&str] = &["/inc/"];
