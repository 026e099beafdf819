use url::Url;

/// 正規化網域：小寫、去除前後空白、結尾的點與開頭的 `www.`
pub fn normalize_domain(domain: &str) -> String {
    let d = domain.trim().trim_end_matches('.').to_lowercase();
    d.strip_prefix("www.").unwrap_or(&d).to_string()
}

/// 從 URL 或裸網域取出主機名稱
///
/// `https://www.toyota.com/rav4` -> `toyota.com`。無法解析時退回對原始字串做正規化。
pub fn extract_domain(input: &str) -> String {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    let candidate = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };

    match Url::parse(&candidate) {
        Ok(url) => url
            .host_str()
            .map(normalize_domain)
            .unwrap_or_else(|| normalize_domain(trimmed)),
        Err(_) => {
            let host = trimmed.split(['/', '?', '#']).next().unwrap_or(trimmed);
            normalize_domain(host)
        }
    }
}

/// 將網域依 `.` 與 `-` 切成 token
pub fn domain_tokens(domain: &str) -> Vec<String> {
    normalize_domain(domain)
        .split(['.', '-'])
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// 由網域組出首頁 URL
pub fn root_url_for(domain: &str) -> String {
    format!("https://{}/", normalize_domain(domain))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_domain_strips_scheme_www_and_path() {
        assert_eq!(extract_domain("https://www.toyota.com/rav4"), "toyota.com");
        assert_eq!(extract_domain("http://Shop.Example.COM/?q=1"), "shop.example.com");
        assert_eq!(extract_domain("www.mayoclinic.org"), "mayoclinic.org");
        assert_eq!(extract_domain("toyota.com"), "toyota.com");
        assert_eq!(extract_domain(""), "");
    }

    #[test]
    fn test_normalize_domain() {
        assert_eq!(normalize_domain(" WWW.Toyota.com. "), "toyota.com");
        assert_eq!(normalize_domain("wwwfoo.com"), "wwwfoo.com");
    }

    #[test]
    fn test_domain_tokens() {
        assert_eq!(
            domain_tokens("www.first-national-bank.com"),
            vec!["first", "national", "bank", "com"]
        );
    }
}
