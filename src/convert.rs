//! Flat JSON dataset → categorized catalog.

use anyhow::{bail, Result};
use serde_json::Value;
use tracing::debug;

use crate::catalog::{Catalog, Category, SiteRecord};

/// Display labels for known category keys. Unknown keys keep the raw key.
const CATEGORY_LABELS: &[(&str, &str)] = &[
    ("navigation", "导航"),
    ("news", "新闻资讯"),
    ("trends", "趋势动态"),
    ("Qrcode", "二维码"),
    ("movie", "影视资源"),
    ("english", "英语学习"),
    ("hack", "编程开发"),
    ("typing", "打字输入"),
    ("airPort", "机场梯子"),
    ("mirror", "镜像下载"),
    ("H5", "H5开发"),
    ("photography", "摄影图像"),
    ("music&sound", "音乐音效"),
    ("stock", "股票基金"),
    ("wallpaper", "壁纸图片"),
    ("icon-font", "图标字体"),
    ("productManager", "产品经理"),
    ("ppt", "PPT资源"),
    ("color", "配色方案"),
    ("games", "游戏娱乐"),
    ("sites", "网站导航"),
    ("art", "艺术设计"),
    ("law", "法律资源"),
    ("ai", "人工智能"),
    ("software", "软件工具"),
];

/// Font Awesome icon ids for known category keys.
const CATEGORY_ICONS: &[(&str, &str)] = &[
    ("navigation", "fa-compass"),
    ("news", "fa-newspaper-o"),
    ("trends", "fa-line-chart"),
    ("Qrcode", "fa-qrcode"),
    ("movie", "fa-film"),
    ("english", "fa-language"),
    ("hack", "fa-code"),
    ("typing", "fa-keyboard-o"),
    ("airPort", "fa-plane"),
    ("mirror", "fa-cloud-download"),
    ("H5", "fa-html5"),
    ("photography", "fa-camera"),
    ("music&sound", "fa-music"),
    ("stock", "fa-area-chart"),
    ("wallpaper", "fa-picture-o"),
    ("icon-font", "fa-flag"),
    ("productManager", "fa-product-hunt"),
    ("ppt", "fa-file-powerpoint-o"),
    ("color", "fa-paint-brush"),
    ("games", "fa-gamepad"),
    ("sites", "fa-sitemap"),
    ("art", "fa-paint-brush"),
    ("law", "fa-gavel"),
    ("ai", "fa-robot"),
    ("software", "fa-desktop"),
];

const DEFAULT_ICON: &str = "fa-star";

fn lookup<'a>(table: &'a [(&str, &str)], key: &str) -> Option<&'a str> {
    table.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
}

/// Convert a category-keyed JSON object into the catalog shape.
///
/// Items without a title yield no record; categories that end up with
/// no records are dropped; input key order is preserved for the rest.
/// Non-array category values are skipped, not errors.
pub fn convert(data: &Value) -> Result<Catalog> {
    let map = match data.as_object() {
        Some(map) => map,
        None => bail!("dataset root must be an object keyed by category"),
    };

    let mut categories = Vec::new();
    for (key, value) in map {
        let items = match value.as_array() {
            Some(items) => items,
            None => {
                debug!("skipping non-list category value: {}", key);
                continue;
            }
        };

        let links: Vec<SiteRecord> = items.iter().filter_map(site_from_item).collect();
        if links.is_empty() {
            continue;
        }

        categories.push(Category {
            taxonomy: lookup(CATEGORY_LABELS, key).unwrap_or(key).to_string(),
            icon: lookup(CATEGORY_ICONS, key).unwrap_or(DEFAULT_ICON).to_string(),
            links,
        });
    }

    Ok(Catalog { categories })
}

/// Copy the recognized fields out of one raw item. No title, no record.
fn site_from_item(item: &Value) -> Option<SiteRecord> {
    let field = |name: &str| item.get(name).and_then(Value::as_str).map(str::to_string);

    Some(SiteRecord {
        title: field("title")?,
        url: field("url"),
        description: field("description"),
        logo: field("logo"),
        qrcode: field("qrcode"),
    })
}

// ── Tests ──
