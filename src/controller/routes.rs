use regex::Regex;

/// List of all routes with params for the app
#[derive(Clone, Debug, PartialEq)]
pub enum Route {
    Healthcheck,
    Products,
    Product(i32),
    Companies,
    Company(i32),
    Categories,
    Category(i32),
    Rfqs,
    Rfq(i32),
    RfqResponses(i32),
    RfqResponse(i32, i32),
    MembershipApplications,
    MembershipApplication(i32),
    CurrentUser,
}

/// Matches a request path against registered patterns
pub struct RouteParser {
    routes: Vec<(Regex, Box<Fn(Vec<&str>) -> Option<Route> + Send + Sync>)>,
}

impl Default for RouteParser {
    fn default() -> Self {
        Self { routes: vec![] }
    }
}

impl RouteParser {
    pub fn add_route<F>(&mut self, pattern: &str, route: F)
    where
        F: Fn() -> Route + Send + Sync + 'static,
    {
        self.add_route_with_params(pattern, move |_| Some(route()));
    }

    pub fn add_route_with_params<F>(&mut self, pattern: &str, route: F)
    where
        F: Fn(Vec<&str>) -> Option<Route> + Send + Sync + 'static,
    {
        let regex = Regex::new(pattern).expect("Invalid route pattern");
        self.routes.push((regex, Box::new(route)));
    }

    pub fn test(&self, path: &str) -> Option<Route> {
        self.routes.iter().filter_map(|&(ref regex, ref route)| {
            regex.captures(path).and_then(|captures| {
                let params = captures
                    .iter()
                    .skip(1)
                    .filter_map(|capture| capture.map(|m| m.as_str()))
                    .collect();
                route(params)
            })
        }).next()
    }
}

pub fn create_route_parser() -> RouteParser {
    let mut router = RouteParser::default();

    // Healthcheck
    router.add_route(r"^/healthcheck$", || Route::Healthcheck);

    // Products routes
    router.add_route(r"^/products$", || Route::Products);

    // Products/:id route
    router.add_route_with_params(r"^/products/(\d+)$", |params| {
        params
            .get(0)
            .and_then(|string_id| string_id.parse::<i32>().ok())
            .map(|product_id| Route::Product(product_id))
    });

    // Companies routes
    router.add_route(r"^/companies$", || Route::Companies);

    // Companies/:id route
    router.add_route_with_params(r"^/companies/(\d+)$", |params| {
        params
            .get(0)
            .and_then(|string_id| string_id.parse::<i32>().ok())
            .map(|company_id| Route::Company(company_id))
    });

    // Categories routes
    router.add_route(r"^/categories$", || Route::Categories);

    // Categories/:id route
    router.add_route_with_params(r"^/categories/(\d+)$", |params| {
        params
            .get(0)
            .and_then(|string_id| string_id.parse::<i32>().ok())
            .map(|category_id| Route::Category(category_id))
    });

    // Rfq routes
    router.add_route(r"^/rfq$", || Route::Rfqs);

    // Rfq/:id route
    router.add_route_with_params(r"^/rfq/(\d+)$", |params| {
        params
            .get(0)
            .and_then(|string_id| string_id.parse::<i32>().ok())
            .map(|rfq_id| Route::Rfq(rfq_id))
    });

    // Rfq/:id/responses route
    router.add_route_with_params(r"^/rfq/(\d+)/responses$", |params| {
        params
            .get(0)
            .and_then(|string_id| string_id.parse::<i32>().ok())
            .map(|rfq_id| Route::RfqResponses(rfq_id))
    });

    // Rfq/:id/responses/:id route
    router.add_route_with_params(r"^/rfq/(\d+)/responses/(\d+)$", |params| {
        if let (Some(rfq_id), Some(response_id)) = (
            params.get(0).and_then(|string_id| string_id.parse::<i32>().ok()),
            params.get(1).and_then(|string_id| string_id.parse::<i32>().ok()),
        ) {
            Some(Route::RfqResponse(rfq_id, response_id))
        } else {
            None
        }
    });

    // Membership applications routes
    router.add_route(r"^/membership/applications$", || Route::MembershipApplications);

    // Membership applications/:id route
    router.add_route_with_params(r"^/membership/applications/(\d+)$", |params| {
        params
            .get(0)
            .and_then(|string_id| string_id.parse::<i32>().ok())
            .map(|application_id| Route::MembershipApplication(application_id))
    });

    // Users/me route
    router.add_route(r"^/users/me$", || Route::CurrentUser);

    router
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_resolve_to_routes() {
        let router = create_route_parser();
        assert_eq!(router.test("/healthcheck"), Some(Route::Healthcheck));
        assert_eq!(router.test("/products"), Some(Route::Products));
        assert_eq!(router.test("/products/17"), Some(Route::Product(17)));
        assert_eq!(router.test("/companies/3"), Some(Route::Company(3)));
        assert_eq!(router.test("/rfq"), Some(Route::Rfqs));
        assert_eq!(router.test("/rfq/5/responses"), Some(Route::RfqResponses(5)));
        assert_eq!(router.test("/rfq/5/responses/8"), Some(Route::RfqResponse(5, 8)));
        assert_eq!(router.test("/membership/applications/2"), Some(Route::MembershipApplication(2)));
        assert_eq!(router.test("/users/me"), Some(Route::CurrentUser));
    }

    #[test]
    fn unknown_paths_do_not_resolve() {
        let router = create_route_parser();
        assert_eq!(router.test("/products/not-a-number"), None);
        assert_eq!(router.test("/unknown"), None);
    }
}
