//! The HTTP status codes the site answers with.

// https://developer.mozilla.org/en-US/docs/Web/HTTP/Status

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpResponseStatusCode {
    OK200,
    Created201,
    SeeOther303,
    NotModified304,
    BadRequest400,
    NotFound404,
    MethodNotAllowed405,
    PayloadTooLarge413,
    InternalServerError500,
}

impl HttpResponseStatusCode {
    pub fn code(self) -> u16 {
        use HttpResponseStatusCode::*;
        match self {
            OK200 => 200,
            Created201 => 201,
            SeeOther303 => 303,
            NotModified304 => 304,
            BadRequest400 => 400,
            NotFound404 => 404,
            MethodNotAllowed405 => 405,
            PayloadTooLarge413 => 413,
            InternalServerError500 => 500,
        }
    }

    pub fn title(self) -> &'static str {
        use HttpResponseStatusCode::*;
        match self {
            OK200 => "OK",
            Created201 => "Created",
            SeeOther303 => "See Other",
            NotModified304 => "Not Modified",
            BadRequest400 => "Bad Request",
            NotFound404 => "Not Found",
            MethodNotAllowed405 => "Method Not Allowed",
            PayloadTooLarge413 => "Payload Too Large",
            InternalServerError500 => "Internal Server Error",
        }
    }

    /// Explanation for error pages.
    pub fn desc(self) -> &'static str {
        use HttpResponseStatusCode::*;
        match self {
            OK200 => "The request succeeded.",
            Created201 => "The resource was created.",
            SeeOther303 => "The resource is found at another location.",
            NotModified304 => "The resource has not changed.",
            BadRequest400 => "The request could not be understood.",
            NotFound404 => "The page you requested does not exist.",
            MethodNotAllowed405 => "This request method is not supported here.",
            PayloadTooLarge413 => "The request body is too large.",
            InternalServerError500 =>
                "Something went wrong on our side. Please try again later.",
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn t_codes() {
        assert_eq!(HttpResponseStatusCode::NotFound404.code(), 404);
        assert_eq!(HttpResponseStatusCode::SeeOther303.title(), "See Other");
        assert_eq!(HttpResponseStatusCode::PayloadTooLarge413.code(), 413);
        assert_eq!(HttpResponseStatusCode::PayloadTooLarge413.title(), "Payload Too Large");
    }
}
